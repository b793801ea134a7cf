use crate::config::Config;
use crate::events::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Errors surfaced by a chat backend
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no API key configured (set {env} or api_key in the config file)")]
    MissingApiKey { env: String },

    #[error("request to the model endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The raw conversational endpoint behind the gateway.
///
/// `send` returns `Ok(None)` when the endpoint answered without usable text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, text: &str) -> Result<Option<String>, GatewayError>;

    fn model_id(&self) -> &str;
}

/// One turn in Gemini's `contents` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.as_api_str().to_string()),
            parts: vec![Part { text: Some(text.into()) }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: Some(text.to_string()) }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Long-lived conversation handle: the curated history sent with every call
#[derive(Debug)]
pub struct ChatSession {
    pub id: Uuid,
    history: Vec<Content>,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }
}

/// Gemini `generateContent` client holding one chat session
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    system_instruction: String,
    api_key: Option<String>,
    api_key_env: String,
    session: Mutex<ChatSession>,
}

impl GeminiBackend {
    pub fn new(config: &Config, system_instruction: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gateway.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.gateway.base_url.trim_end_matches('/').to_string(),
            model: config.gateway.model.clone(),
            system_instruction: system_instruction.into(),
            api_key: config.api_key(),
            api_key_env: config.gateway.api_key_env.clone(),
            session: Mutex::new(ChatSession::new()),
        })
    }

    /// Number of turns recorded in the session so far
    pub async fn history_len(&self) -> usize {
        self.session.lock().await.history.len()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, api_key: &str, contents: &[Content]) -> Result<GenerateContentResponse, GatewayError> {
        let payload = GenerateContentRequest {
            system_instruction: Content::system(&self.system_instruction),
            contents,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn send(&self, text: &str) -> Result<Option<String>, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| GatewayError::MissingApiKey {
            env: self.api_key_env.clone(),
        })?;

        // Held for the whole exchange so turns are recorded in order
        let mut session = self.session.lock().await;

        let mut contents = session.history.clone();
        contents.push(Content::text(Role::User, text));

        let response = self.generate(api_key, &contents).await?;
        let reply = response.text();

        match &reply {
            Some(reply) => {
                session.history.push(Content::text(Role::User, text));
                session.history.push(Content::text(Role::Model, reply.clone()));
            }
            None => debug!(session = %session.id, "response carried no text, history unchanged"),
        }

        Ok(reply)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
