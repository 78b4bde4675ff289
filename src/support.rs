//! Support chat: one best-effort request per user turn to an external reply
//! endpoint. Failures never reach the caller; they show up as a fixed
//! assistant message instead.

use crate::config::SupportSettings;
use crate::errors::{InputError, RemoteError};
use crate::models::MoodCategory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body sent to the reply endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SupportReply {
    reply: String,
}

#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn reply(&self, request: &SupportRequest) -> Result<String, RemoteError>;
}

/// Used when no chat endpoint is configured; every turn gets the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSupport;

#[async_trait]
impl ReplyBackend for UnconfiguredSupport {
    async fn reply(&self, _request: &SupportRequest) -> Result<String, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

pub struct HttpSupportClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpSupportClient {
    pub fn new(http: reqwest::Client, url: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http,
            url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl ReplyBackend for HttpSupportClient {
    async fn reply(&self, request: &SupportRequest) -> Result<String, RemoteError> {
        let mut builder = self.http.post(&self.url).timeout(self.timeout).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await);
        }
        let body: SupportReply = response.json().await?;
        if body.reply.trim().is_empty() {
            return Err(RemoteError::Malformed("empty reply".to_string()));
        }
        Ok(body.reply)
    }
}

pub fn backend_from_settings(settings: &SupportSettings, http: &reqwest::Client) -> Box<dyn ReplyBackend> {
    match &settings.url {
        Some(url) => Box::new(HttpSupportClient::new(
            http.clone(),
            url.clone(),
            settings.api_key.clone(),
            settings.timeout,
        )),
        None => Box::new(UnconfiguredSupport),
    }
}

/// In-memory transcript of one support chat.
#[derive(Debug, Clone)]
pub struct Conversation {
    mood: Option<MoodCategory>,
    context: Option<String>,
    turns: Vec<ChatTurn>,
    awaiting_reply: bool,
}

impl Conversation {
    /// Starts with a greeting that mentions the mood when it is known.
    pub fn new(mood: Option<MoodCategory>, context: Option<String>) -> Self {
        let mood_line = mood
            .map(|mood| format!(" I understand you're feeling {mood} right now."))
            .unwrap_or_default();
        let welcome = format!(
            "Hello! I'm here to provide emotional support and listen to whatever you'd like to share.{mood_line} How can I help you today?"
        );
        Self {
            mood,
            context: context.filter(|value| !value.trim().is_empty()),
            turns: vec![ChatTurn::new(Role::Assistant, welcome)],
            awaiting_reply: false,
        }
    }

    pub fn mood(&self) -> Option<MoodCategory> {
        self.mood
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Records the user's turn and marks a reply as outstanding. The returned
    /// request is sent without holding the conversation; [`finish_turn`]
    /// closes it.
    ///
    /// [`finish_turn`]: Conversation::finish_turn
    pub fn begin_turn(&mut self, text: &str) -> Result<SupportRequest, InputError> {
        if text.trim().is_empty() {
            return Err(InputError::EmptyMessage);
        }
        if self.awaiting_reply {
            return Err(InputError::ReplyPending);
        }

        self.turns.push(ChatTurn::new(Role::User, text));
        self.awaiting_reply = true;
        Ok(SupportRequest {
            message: text.to_string(),
            mood: self.mood,
            context: self.context.clone(),
        })
    }

    /// Appends the assistant's answer, or the fallback when the backend
    /// failed, and clears the outstanding flag.
    pub fn finish_turn(&mut self, outcome: Result<String, RemoteError>) -> ChatTurn {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(RemoteError::Unavailable) => FALLBACK_REPLY.to_string(),
            Err(err) => {
                warn!("support chat failed: {err}");
                FALLBACK_REPLY.to_string()
            }
        };

        let turn = ChatTurn::new(Role::Assistant, reply);
        self.turns.push(turn.clone());
        self.awaiting_reply = false;
        turn
    }
}

/// Appends the user's text and the assistant's answer (or the fallback) and
/// returns the assistant turn. Blank text is rejected before any request.
pub async fn send_support_message(
    conversation: &mut Conversation,
    backend: &dyn ReplyBackend,
    text: &str,
) -> Result<ChatTurn, InputError> {
    let request = conversation.begin_turn(text)?;
    let outcome = backend.reply(&request).await;
    Ok(conversation.finish_turn(outcome))
}
