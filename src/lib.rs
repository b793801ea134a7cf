//! WEBSOLUTE AI chat client.
//!
//! A conversation store, an assistant gateway over Gemini, and the controller
//! that runs one submission at a time between them, plus the terminal UI that
//! renders the log.

pub mod config;
pub mod controller;
pub mod events;
pub mod gateway;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod store;
pub mod tui;
pub mod ui;

pub use config::Config;
pub use controller::{classify_report, ConversationController, RejectReason, Submission};
pub use events::{Message, Role};
pub use gateway::AssistantGateway;
pub use llm::{ChatBackend, GatewayError, GeminiBackend};
pub use store::{ConversationStore, SharedStore};
