use crate::prompts;
use crate::ui::conversation::commands::{parse_slash_command, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Widget,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// Single-line message input.
///
/// The cursor counts characters, not bytes, so Hangul input edits cleanly.
/// Submitting does not clear the text; the owner clears it once the
/// submission has been accepted.
#[derive(Debug, Clone)]
pub struct Composer {
    content: String,
    cursor: usize,
    enabled: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            enabled: true,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(&self.content) {
                    return ComposerResult::Command(command);
                }
                if !self.content.trim().is_empty() {
                    return ComposerResult::Submitted(self.content.clone());
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.content.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_offset(self.cursor);
                    self.content.remove(at);
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = self.char_len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor; newlines become spaces
    pub fn paste(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(offset, _)| offset)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Dimmed while a reply is pending
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn can_send(&self) -> bool {
        self.enabled && !self.content.trim().is_empty()
    }

    /// Byte offset of the first visible character when the line is `width`
    /// columns wide, scrolled just far enough to keep the cursor in view
    fn visible_start(&self, width: usize) -> usize {
        let before = &self.content[..self.byte_offset(self.cursor)];
        // one column is reserved for the cursor
        let available = width.saturating_sub(1);

        let mut start = 0;
        let mut shown = before.width();
        for c in before.chars() {
            if shown <= available {
                break;
            }
            shown -= c.width().unwrap_or(0);
            start += c.len_utf8();
        }
        start
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &Composer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.enabled { Color::Blue } else { Color::DarkGray };
        let send_style = if self.can_send() {
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(
                Title::from(Span::styled(" ⏎ Send ", send_style))
                    .alignment(Alignment::Right)
                    .position(Position::Bottom),
            );

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.content.is_empty() {
            Line::from(Span::styled(
                prompts::INPUT_PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let at = self.byte_offset(self.cursor);
            let start = self.visible_start(inner.width as usize);
            let (before, after) = (&self.content[start..at], &self.content[at..]);
            let mut spans = vec![Span::raw(before.to_string())];
            if self.enabled {
                spans.push(Span::styled("▌", Style::default().fg(Color::Blue)));
            }
            spans.push(Span::raw(after.to_string()));
            Line::from(spans)
        };

        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
