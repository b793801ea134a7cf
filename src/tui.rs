use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::UiConfig;
use crate::controller::ConversationController;
use crate::events::AppEvent;
use crate::store;
use crate::ui::conversation::{ConversationAction, ConversationManager};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Merges terminal input and the animation tick into one stream
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                let app_event = match evt {
                    // Only handle key press events, not release
                    Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                    Event::Paste(text) => Some(AppEvent::Paste(text)),
                    Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
                    _ => None,
                };

                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stderr(), EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Run the interactive chat until the user quits
pub async fn run(controller: ConversationController, ui: UiConfig) -> Result<()> {
    install_panic_hook();
    let mut terminal = init()?;

    let result = event_loop(&mut terminal, controller, ui).await;

    restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, controller: ConversationController, ui: UiConfig) -> Result<()> {
    let mut revisions = store::lock(controller.store()).subscribe();
    let mut events = EventHandler::new(Duration::from_millis(ui.tick_rate_ms.max(16)));
    let mut manager = ConversationManager::new(controller, ui);

    info!("chat session started");
    loop {
        terminal.draw(|frame| manager.render(frame))?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                if manager.handle_event(event) == ConversationAction::Exit {
                    break;
                }
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                manager.on_store_changed();
            }
        }
    }
    info!("chat session ended");

    Ok(())
}
