//! Assistant gateway: one async call per user utterance.
//!
//! Wraps a [`ChatBackend`] created once at startup and reused for the life of
//! the application, so the endpoint keeps its conversation context across
//! calls. Replies without text are replaced with a canned apology.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::Config;
use crate::llm::{ChatBackend, GatewayError, GeminiBackend};
use crate::prompts;

pub struct AssistantGateway {
    backend: Arc<dyn ChatBackend>,
}

impl AssistantGateway {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Gateway over Gemini with the WEBSOLUTE AI persona
    pub fn gemini(config: &Config) -> Result<Self, GatewayError> {
        let backend = GeminiBackend::new(config, prompts::SYSTEM_INSTRUCTION)?;
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    /// Send `text` as the next user turn and return the reply text
    pub async fn send_message(&self, text: &str) -> Result<String, GatewayError> {
        let start = Instant::now();
        let result = self.backend.send(text).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Some(reply)) => {
                info!(model = %self.model_id(), elapsed_ms, reply_chars = reply.chars().count(), "assistant replied");
                Ok(reply)
            }
            Ok(None) => {
                warn!(model = %self.model_id(), elapsed_ms, "assistant reply had no text");
                Ok(prompts::EMPTY_REPLY_FALLBACK.to_string())
            }
            Err(err) => {
                warn!(model = %self.model_id(), elapsed_ms, error = %err, "assistant request failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// What the scripted backend answers for one call
    pub enum Scripted {
        Reply(&'static str),
        Empty,
        Fail(u16),
    }

    /// Backend double that plays back scripted answers and records calls.
    ///
    /// When gated, every call waits for [`ScriptedBackend::release`].
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<String>>,
        gate: Option<Notify>,
    }

    impl ScriptedBackend {
        pub fn new(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
                gate: None,
            })
        }

        pub fn gated(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
                gate: Some(Notify::new()),
            })
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send(&self, text: &str) -> Result<Option<String>, GatewayError> {
            self.calls.lock().unwrap().push(text.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(reply)) => Ok(Some(reply.to_string())),
                Some(Scripted::Empty) | None => Ok(None),
                Some(Scripted::Fail(status)) => Err(GatewayError::Status {
                    status,
                    body: "scripted failure".to_string(),
                }),
            }
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }
}
