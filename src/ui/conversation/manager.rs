use crate::config::UiConfig;
use crate::controller::{ConversationController, Submission};
use crate::events::AppEvent;
use crate::prompts;
use crate::store;
use crate::ui::conversation::commands::{help_lines, SlashCommand};
use crate::ui::conversation::composer::{Composer, ComposerResult};
use crate::ui::conversation::history::{self, HistoryView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Chat screen: feeds the composer into the controller and draws the store
pub struct ConversationManager {
    controller: ConversationController,
    composer: Composer,
    ui: UiConfig,
    scroll: usize,
    show_help: bool,
    frame: usize,
}

impl ConversationManager {
    pub fn new(controller: ConversationController, ui: UiConfig) -> Self {
        Self {
            controller,
            composer: Composer::new(),
            ui,
            scroll: 0,
            show_help: false,
            frame: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    /// Handle one terminal event
    pub fn handle_event(&mut self, event: AppEvent) -> ConversationAction {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Paste(text) => self.composer.paste(&text),
            AppEvent::Tick => self.frame = self.frame.wrapping_add(1),
            AppEvent::Resize(_, _) => {}
        }
        ConversationAction::None
    }

    /// The store changed: follow the newest message
    pub fn on_store_changed(&mut self) {
        self.scroll = 0;
    }

    fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ConversationAction::Exit;
        }

        match key.code {
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return ConversationAction::None;
            }
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(5);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(5);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(input) => {
                if let Submission::Accepted(_) = self.controller.submit(&input) {
                    self.composer.clear();
                    self.scroll = 0;
                }
                ConversationAction::None
            }
            ComposerResult::Command(command) => {
                debug!(command = command.command.command(), "slash command");
                self.composer.clear();
                match command.command {
                    SlashCommand::Help => {
                        self.show_help = !self.show_help;
                        ConversationAction::None
                    }
                    SlashCommand::Bye => ConversationAction::Exit,
                }
            }
            ComposerResult::None => ConversationAction::None,
        }
    }

    /// Draw the whole chat screen
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // History
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Footer
            ])
            .split(area);

        frame.render_widget(header(), chunks[0]);

        {
            let state = store::lock(self.controller.store());
            let pending = state.is_pending();
            self.composer.set_enabled(!pending);

            let history_area = chunks[1].inner(&ratatui::layout::Margin::new(1, 0));
            let total = history::build_lines(
                state.messages(),
                pending,
                self.frame,
                history_area.width as usize,
                self.ui.show_timestamps,
            )
            .len();
            self.scroll = self.scroll.min(history::max_scroll(total, history_area.height as usize));

            frame.render_widget(
                HistoryView {
                    messages: state.messages(),
                    pending,
                    frame: self.frame,
                    scroll: self.scroll,
                    show_timestamps: self.ui.show_timestamps,
                },
                history_area,
            );
        }

        frame.render_widget(&self.composer, chunks[2]);
        frame.render_widget(footer(), chunks[3]);

        if self.show_help {
            render_help(frame, area);
        }
    }
}

fn header() -> Paragraph<'static> {
    let title = Line::from(vec![
        Span::styled(
            prompts::APP_TITLE,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("● ", Style::default().fg(Color::Green)),
        Span::styled(prompts::STATUS_ONLINE, Style::default().fg(Color::Gray)),
    ]);

    Paragraph::new(title).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
}

fn footer() -> Paragraph<'static> {
    let style = Style::default().fg(Color::DarkGray);
    Paragraph::new(Line::from(vec![
        Span::styled(format!("ⓘ {}", prompts::DISCLAIMER), style),
        Span::styled("  ·  ", style),
        Span::styled(prompts::VERSION_TAG, style.add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
}

fn render_help(frame: &mut Frame<'_>, area: Rect) {
    let lines: Vec<Line> = help_lines().into_iter().map(Line::from).collect();
    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 64.min(area.width);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Blue)),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{Scripted, ScriptedBackend};
    use crate::gateway::AssistantGateway;
    use crate::store::ConversationStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn manager(backend: Arc<ScriptedBackend>) -> ConversationManager {
        let gateway = Arc::new(AssistantGateway::new(backend));
        let controller = ConversationController::new(ConversationStore::shared(), gateway);
        ConversationManager::new(controller, UiConfig::default())
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(manager: &mut ConversationManager, text: &str) {
        for c in text.chars() {
            manager.handle_event(key(KeyCode::Char(c)));
        }
    }

    fn log_len(manager: &ConversationManager) -> usize {
        store::lock(manager.controller().store()).len()
    }

    #[tokio::test]
    async fn accepted_submission_clears_composer() {
        let backend = ScriptedBackend::gated([Scripted::Reply("ok")]);
        let mut manager = manager(backend.clone());

        type_text(&mut manager, "BTC 분석");
        manager.handle_event(key(KeyCode::Enter));

        assert_eq!(manager.composer().content(), "");
        assert_eq!(log_len(&manager), 2);
        assert!(manager.controller().is_pending());
        backend.release();
    }

    #[tokio::test]
    async fn rejected_submission_keeps_typed_text() {
        let backend = ScriptedBackend::gated([Scripted::Reply("ok")]);
        let mut manager = manager(backend.clone());

        type_text(&mut manager, "first");
        manager.handle_event(key(KeyCode::Enter));
        // let the spawned exchange reach the backend
        tokio::task::yield_now().await;
        type_text(&mut manager, "second");
        manager.handle_event(key(KeyCode::Enter));

        assert_eq!(manager.composer().content(), "second");
        assert_eq!(log_len(&manager), 2);
        assert_eq!(backend.calls().len(), 1);
        backend.release();
    }

    #[tokio::test]
    async fn slash_commands_never_reach_the_gateway() {
        let backend = ScriptedBackend::new(Vec::<Scripted>::new());
        let mut manager = manager(backend.clone());

        type_text(&mut manager, "/help");
        assert_eq!(manager.handle_event(key(KeyCode::Enter)), ConversationAction::None);
        assert!(manager.is_help_visible());
        assert_eq!(manager.handle_event(key(KeyCode::Esc)), ConversationAction::None);
        assert!(!manager.is_help_visible());

        type_text(&mut manager, "/bye");
        assert_eq!(manager.handle_event(key(KeyCode::Enter)), ConversationAction::Exit);

        assert!(backend.calls().is_empty());
        assert_eq!(log_len(&manager), 1);
    }

    #[tokio::test]
    async fn ctrl_c_exits() {
        let mut manager = manager(ScriptedBackend::new(Vec::<Scripted>::new()));
        let event = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(manager.handle_event(event), ConversationAction::Exit);
    }

    #[tokio::test]
    async fn renders_greeting_header_and_footer() {
        let mut manager = manager(ScriptedBackend::new(Vec::<Scripted>::new()));
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();

        terminal.draw(|frame| manager.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("WEBSOLUTE AI"));
        assert!(screen.contains("Websolute AI v2.4"));
        // wide Hangul cells are followed by filler cells, so match ASCII only
        assert!(screen.contains("10:00"));
    }
}
