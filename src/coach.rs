//! Coaching chat. The transcript lives in the `coach_messages` collection;
//! replies come from a remote chat-completion endpoint when one is
//! configured, otherwise from a fixed offline message.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    config::Settings,
    error::{CoachError, StoreError},
    models::CoachMessage,
    store::{Collection, Order, Store},
    types::{CoachMode, Role},
};

pub const SYSTEM_PROMPT: &str = "You are IronLog AI Coach, an expert fitness and strength training assistant built into the IronLog workout tracker app. Your role:

- Give practical, evidence-based advice on training, nutrition, recovery, and motivation
- Be concise: respond in 2-4 paragraphs max unless the user asks for detail
- Use a direct, encouraging but not fake-cheerful tone
- Reference progressive overload principles when relevant
- When asked about exercises, recommend checking the app's Exercise Catalog
- Never give medical advice; recommend seeing a doctor for injuries or health concerns
- If the user shares their workout data, analyze it and give specific feedback
- Use metric units (kg, cm) by default";

pub const OFFLINE_REPLY: &str = "I'm running offline right now. Set `coach_mode = \"api\"` and a `coach_api_key` with `ironlog config set` to chat with a live coach. In the meantime, keep logging your sessions and aim to beat last week's numbers.";

pub const APOLOGY: &str = "Sorry, something went wrong. Please try again.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a chat-completion response.
pub fn parse_reply(body: &str) -> Result<String, CoachError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "chat response is not the expected shape");
        CoachError::MalformedResponse
    })?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(CoachError::MalformedResponse)
}

/// Client for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Result<Self, CoachError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Sends the system prompt followed by `transcript` and returns the
    /// assistant's reply text.
    pub async fn complete(&self, transcript: &[CoachMessage]) -> Result<String, CoachError> {
        let messages = std::iter::once(ChatTurn {
            role: "system",
            content: SYSTEM_PROMPT,
        })
        .chain(transcript.iter().map(|m| ChatTurn {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &m.content,
        }))
        .collect();
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        debug!(endpoint = %self.endpoint, turns = transcript.len(), "sending chat request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoachError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_reply(&body)
    }
}

pub struct Coach<'a> {
    store: &'a Store,
    client: Option<ChatClient>,
}

impl<'a> Coach<'a> {
    /// Uses the remote endpoint only in `api` mode with a non-empty key.
    pub fn new(store: &'a Store, settings: &Settings) -> Result<Self, CoachError> {
        let client = match (settings.coach_mode, settings.api_key.as_deref()) {
            (CoachMode::Api, Some(key)) => Some(ChatClient::new(
                &settings.api_endpoint,
                key,
                &settings.api_model,
            )?),
            _ => None,
        };
        Ok(Self { store, client })
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// The transcript, oldest first.
    pub async fn history(&self) -> Result<Vec<CoachMessage>, StoreError> {
        self.store.ordered(Order::Asc).await
    }

    /// Records `content` and returns the assistant's reply. Failures are
    /// logged and answered with [`APOLOGY`], which is not stored.
    pub async fn send_message(&self, content: &str) -> CoachMessage {
        match self.exchange(content).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "coach reply failed");
                CoachMessage::new(Role::Assistant, APOLOGY)
            }
        }
    }

    async fn exchange(&self, content: &str) -> Result<CoachMessage, CoachError> {
        let question = CoachMessage::new(Role::User, content);
        self.store.insert(&question).await?;

        let text = match &self.client {
            Some(client) => {
                let transcript = self.history().await?;
                client.complete(&transcript).await?
            }
            None => OFFLINE_REPLY.to_string(),
        };

        let reply = CoachMessage::new(Role::Assistant, text);
        self.store.insert(&reply).await?;
        Ok(reply)
    }

    pub async fn clear_messages(&self) -> Result<(), StoreError> {
        self.store.clear(Collection::CoachMessages).await
    }
}
