//! Conversation history display component

use crate::events::{Message, Role};
use crate::prompts;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const INDENT: &str = "  ";
const LOADING_FRAMES: [&str; 3] = ["● ○ ○", "○ ● ○", "○ ○ ●"];

/// Renders the message log, bottom-anchored.
///
/// `scroll` counts lines back from the newest one; 0 follows the tail.
pub struct HistoryView<'a> {
    pub messages: &'a [Message],
    pub pending: bool,
    pub frame: usize,
    pub scroll: usize,
    pub show_timestamps: bool,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = build_lines(
            self.messages,
            self.pending,
            self.frame,
            area.width as usize,
            self.show_timestamps,
        );

        let height = area.height as usize;
        let scroll = self.scroll.min(max_scroll(lines.len(), height));
        let end = lines.len() - scroll;
        let start = end.saturating_sub(height);

        Paragraph::new(lines[start..end].to_vec()).render(area, buf);
    }
}

/// Largest useful scroll offset for `total` lines in a view `height` tall
pub fn max_scroll(total: usize, height: usize) -> usize {
    total.saturating_sub(height)
}

/// All display lines for the log, plus the loading bubble while pending
pub fn build_lines(
    messages: &[Message],
    pending: bool,
    frame: usize,
    width: usize,
    show_timestamps: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        match message.role {
            Role::User => lines.extend(user_lines(message, width, show_timestamps)),
            Role::Model => lines.extend(model_lines(message, width, show_timestamps)),
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(assistant_header(None));
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(
                LOADING_FRAMES[frame % LOADING_FRAMES.len()],
                Style::default().fg(Color::Blue),
            ),
        ]));
    }

    lines
}

fn assistant_header(timestamp: Option<&str>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("✦ {}", prompts::APP_TITLE),
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    )];
    if let Some(timestamp) = timestamp {
        spans.push(Span::styled(
            format!("  {}", timestamp),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn model_lines(message: &Message, width: usize, show_timestamps: bool) -> Vec<Line<'static>> {
    let timestamp = show_timestamps.then_some(message.timestamp.as_str());
    let mut lines = vec![assistant_header(timestamp)];

    if message.is_report {
        lines.extend(report_card(&message.text, width));
    } else {
        let text_width = width.saturating_sub(INDENT.len());
        for chunk in wrap_text(&message.text, text_width) {
            lines.push(Line::from(vec![Span::raw(INDENT), Span::raw(chunk)]));
        }
    }

    lines
}

fn user_lines(message: &Message, width: usize, show_timestamps: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if show_timestamps {
        lines.push(
            Line::from(Span::styled(
                message.timestamp.clone(),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Right),
        );
    }

    let bubble = Style::default().fg(Color::White).bg(Color::Blue);
    for chunk in wrap_text(&message.text, width * 85 / 100) {
        lines.push(Line::from(Span::styled(format!(" {} ", chunk), bubble)).alignment(Alignment::Right));
    }

    lines.push(
        Line::from(Span::styled(
            format!("◆ {}", prompts::USER_BADGE),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
    );
    lines
}

/// Bordered card used for market report replies
fn report_card(text: &str, width: usize) -> Vec<Line<'static>> {
    let border = Style::default().fg(Color::Blue);
    let card_width = width.saturating_sub(INDENT.len() + 1).max(12);
    let text_width = card_width.saturating_sub(2);

    let title = format!(" {} ", prompts::REPORT_TITLE);
    let title_fill = card_width.saturating_sub(title.width() + 1);
    let mut lines = vec![Line::from(vec![
        Span::raw(INDENT),
        Span::styled("╭─", border),
        Span::styled(title, border.add_modifier(Modifier::BOLD)),
        Span::styled("─".repeat(title_fill), border),
    ])];

    let edge = || vec![Span::raw(INDENT), Span::styled("│ ", border)];

    for chunk in wrap_text(text, text_width) {
        let mut spans = edge();
        spans.push(Span::styled(chunk, Style::default().fg(Color::Gray)));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(edge()));
    let mut chart = edge();
    chart.push(Span::styled(
        chart_band(text_width),
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(chart));

    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(format!("├{}", "─".repeat(card_width)), border),
    ]));
    let mut download = edge();
    download.push(Span::styled(
        format!("{} ↓", prompts::REPORT_DOWNLOAD_LABEL),
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(download));
    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(format!("╰{}", "─".repeat(card_width)), border),
    ]));

    lines
}

/// Placeholder band standing in for the momentum chart
fn chart_band(width: usize) -> String {
    let label = format!(" {} ", prompts::REPORT_CHART_LABEL);
    let shade = width.saturating_sub(label.width());
    let left = shade / 2;
    format!("{}{}{}", "░".repeat(left), label, "░".repeat(shade - left))
}

/// Wrap text to fit within `width` display columns.
///
/// Explicit newlines, indentation and runs of spaces are kept; whitespace at a
/// wrap point is dropped and words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.replace('\t', "    ");
        let mut current = String::new();
        let mut current_width = 0;
        let mut wrapped = false;

        for run in whitespace_runs(&paragraph) {
            let run_width = run.width();

            if run.starts_with(char::is_whitespace) {
                if current.is_empty() && wrapped {
                    continue;
                }
                if current_width + run_width <= width {
                    current.push_str(run);
                    current_width += run_width;
                } else if !current.is_empty() {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                    current_width = 0;
                    wrapped = true;
                }
                continue;
            }

            if current_width + run_width <= width {
                current.push_str(run);
                current_width += run_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_width = 0;
                wrapped = true;
            }

            for c in run.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width + char_width > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                    wrapped = true;
                }
                current.push(c);
                current_width += char_width;
            }
        }

        lines.push(current);
    }

    lines
}

/// Split `text` into alternating runs of whitespace and non-whitespace
fn whitespace_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut previous = None;

    for (offset, c) in text.char_indices() {
        let space = c.is_whitespace();
        if previous.is_some_and(|was_space| was_space != space) {
            runs.push(&text[start..offset]);
            start = offset;
        }
        previous = Some(space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }

    runs
}
