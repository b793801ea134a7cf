use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands handled by the client itself; they are never sent to the assistant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show or hide the help overlay
    Help,
    /// Exit the application
    Bye,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show or hide this help",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input.
///
/// Trailing words after the command are ignored. Unknown commands return
/// `None` so the text goes to the assistant as typed.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;

    let head = rest.split_whitespace().next()?.to_lowercase();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    Some(ParsedCommand { command })
}

/// Lines for the help overlay
pub fn help_lines() -> Vec<String> {
    let mut lines: Vec<String> = SlashCommand::iter()
        .map(|command| format!("/{:<6} {}", command.command(), command.description()))
        .collect();

    lines.push(String::new());
    lines.push("Aliases: /q /quit /exit for /bye, /h /? for /help".to_string());
    lines.push("Enter sends · PgUp/PgDn scroll · Esc or Ctrl+C quits".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_slash_command("/help").map(|c| c.command), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("  /BYE ").map(|c| c.command), Some(SlashCommand::Bye));
        assert_eq!(parse_slash_command("/q").map(|c| c.command), Some(SlashCommand::Bye));
        assert_eq!(parse_slash_command("/?").map(|c| c.command), Some(SlashCommand::Help));
    }

    #[test]
    fn trailing_words_are_ignored() {
        assert_eq!(
            parse_slash_command("/help me please"),
            Some(ParsedCommand { command: SlashCommand::Help })
        );
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(parse_slash_command("BTC 분석"), None);
        assert_eq!(parse_slash_command("/unknown thing"), None);
        assert_eq!(parse_slash_command("/"), None);
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_lines().join("\n");
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
