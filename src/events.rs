use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::prompts;

/// Internal application events for coordinating between components
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),

    /// Animation tick
    Tick,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name as the Gemini API spells it
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_report: bool,
}

impl Message {
    /// A user message stamped with the current local time
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: local_timestamp(),
            is_report: false,
        }
    }

    /// A model message stamped with the current local time
    pub fn model(text: impl Into<String>, is_report: bool) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: local_timestamp(),
            is_report,
        }
    }

    /// The introductory message every conversation starts with
    pub fn greeting() -> Self {
        Self {
            role: Role::Model,
            text: prompts::GREETING.to_string(),
            timestamp: prompts::GREETING_TIMESTAMP.to_string(),
            is_report: false,
        }
    }
}

/// Current wall-clock time formatted for display
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Korean 12-hour clock with two-digit hour and minute, e.g. `오후 03:25`
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    let (is_pm, hour) = time.hour12();
    let meridiem = if is_pm { "오후" } else { "오전" };
    format!("{} {:02}:{:02}", meridiem, hour, time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 10, 24, hour, minute, 0).unwrap()
    }

    #[test]
    fn formats_morning_and_afternoon() {
        assert_eq!(format_timestamp(&at(9, 5)), "오전 09:05");
        assert_eq!(format_timestamp(&at(15, 25)), "오후 03:25");
    }

    #[test]
    fn formats_noon_and_midnight_as_twelve() {
        assert_eq!(format_timestamp(&at(0, 0)), "오전 12:00");
        assert_eq!(format_timestamp(&at(12, 30)), "오후 12:30");
    }

    #[test]
    fn greeting_is_a_plain_model_message() {
        let greeting = Message::greeting();
        assert_eq!(greeting.role, Role::Model);
        assert!(!greeting.is_report);
        assert_eq!(greeting.timestamp, "오전 10:00");
    }

    #[test]
    fn report_flag_is_omitted_when_false() {
        let json = serde_json::to_value(Message::model("hi", false)).unwrap();
        assert!(json.get("is_report").is_none());
        assert_eq!(json["role"], "model");

        let json = serde_json::to_value(Message::model("hi", true)).unwrap();
        assert_eq!(json["is_report"], true);
    }
}
