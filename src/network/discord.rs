// src/network/discord.rs
//! Discord REST client
//!
//! Only the handful of endpoints the bot needs: identify the bot user,
//! create a channel message, fetch it back and edit it in place.

use crate::types::{MessageContent, MessageHandle};
use crate::utils::error::BotError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

/// Chat operations the publisher depends on
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolves the bot's own user tag; success means the session is ready
    async fn current_user(&self) -> Result<String, BotError>;

    /// Posts a new message and returns its handle
    async fn send_message(
        &self,
        channel_id: &str,
        content: &MessageContent,
    ) -> Result<MessageHandle, BotError>;

    /// Replaces the content of an existing message
    ///
    /// # Errors
    /// `BotError::MessageNotFound` if the message was deleted
    async fn edit_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
        content: &MessageContent,
    ) -> Result<(), BotError>;

    /// Confirms a message still exists
    ///
    /// # Errors
    /// `BotError::MessageNotFound` if the message was deleted
    async fn fetch_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
    ) -> Result<MessageHandle, BotError>;
}

/// Bot-token authenticated client for the Discord HTTP API
pub struct DiscordClient {
    /// API root without trailing slash (e.g. "https://discord.com/api/v10")
    base_url: String,
    /// Bot token
    token: String,
    /// HTTP client for making API requests
    http: Client,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserObject {
    username: String,
    #[serde(default)]
    discriminator: Option<String>,
}

impl DiscordClient {
    /// Creates a client
    ///
    /// # Errors
    /// Returns `BotError::ChatPlatform` if the HTTP client can't be built
    pub fn new(base_url: &str, token: String) -> Result<Self, BotError> {
        let http = Client::builder()
            .user_agent(format!(
                "DiscordBot ({}, {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| BotError::chat("Failed to build HTTP client", e))?;

        Ok(DiscordClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn current_user(&self) -> Result<String, BotError> {
        let resp = self
            .http
            .get(self.api_url("/users/@me"))
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| BotError::chat("Login request failed", e))?;

        let user: UserObject = ensure_success(resp, "Login", None)
            .await?
            .json()
            .await
            .map_err(|e| BotError::chat("Invalid user object", e))?;

        Ok(user_tag(&user.username, user.discriminator.as_deref()))
    }

    async fn send_message(
        &self,
        channel_id: &str,
        content: &MessageContent,
    ) -> Result<MessageHandle, BotError> {
        let resp = self
            .http
            .post(self.api_url(&format!("/channels/{}/messages", channel_id)))
            .header("Authorization", self.auth())
            .json(&message_body(content))
            .send()
            .await
            .map_err(|e| BotError::chat("Create message request failed", e))?;

        let message: MessageObject = ensure_success(resp, "Create message", None)
            .await?
            .json()
            .await
            .map_err(|e| BotError::chat("Invalid message object", e))?;

        Ok(MessageHandle(message.id))
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
        content: &MessageContent,
    ) -> Result<(), BotError> {
        let resp = self
            .http
            .patch(self.api_url(&format!(
                "/channels/{}/messages/{}",
                channel_id, handle
            )))
            .header("Authorization", self.auth())
            .json(&message_body(content))
            .send()
            .await
            .map_err(|e| BotError::chat("Edit message request failed", e))?;

        ensure_success(resp, "Edit message", Some(handle)).await?;
        Ok(())
    }

    async fn fetch_message(
        &self,
        channel_id: &str,
        handle: &MessageHandle,
    ) -> Result<MessageHandle, BotError> {
        let resp = self
            .http
            .get(self.api_url(&format!(
                "/channels/{}/messages/{}",
                channel_id, handle
            )))
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| BotError::chat("Fetch message request failed", e))?;

        let message: MessageObject = ensure_success(resp, "Fetch message", Some(handle))
            .await?
            .json()
            .await
            .map_err(|e| BotError::chat("Invalid message object", e))?;

        Ok(MessageHandle(message.id))
    }
}

/// Maps non-2xx responses to errors
///
/// A 404 on a message-scoped call means the message is gone.
async fn ensure_success(
    resp: Response,
    action: &str,
    handle: Option<&MessageHandle>,
) -> Result<Response, BotError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(handle) = handle {
            return Err(BotError::MessageNotFound(handle.to_string()));
        }
    }

    let body = resp.text().await.unwrap_or_default();
    Err(BotError::ChatPlatform(format!(
        "{} returned {}: {}",
        action,
        status,
        body.chars().take(200).collect::<String>()
    )))
}

/// JSON body for create/edit calls
pub(crate) fn message_body(content: &MessageContent) -> Value {
    match content {
        MessageContent::Embed(embed) => json!({ "embeds": [embed] }),
        MessageContent::Text(text) => json!({ "content": text }),
    }
}

/// Formats a user tag; new-style usernames have discriminator "0"
fn user_tag(username: &str, discriminator: Option<&str>) -> String {
    match discriminator {
        Some(d) if d != "0" => format!("{}#{}", username, d),
        _ => username.to_string(),
    }
}
