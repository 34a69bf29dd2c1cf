// src/publisher/sink.rs
//! Create-or-edit publishing of the status message

use crate::network::discord::ChatPlatform;
use crate::types::{MessageContent, MessageHandle, RenderedMessage};
use crate::utils::error::BotError;
use std::sync::Arc;

/// Writes rendered stats into one chat channel
///
/// The sink holds no message state. The caller owns the handle of the
/// message it created and passes it back in on every publish.
pub struct MessageSink {
    /// Chat platform used for all calls
    platform: Arc<dyn ChatPlatform>,
    /// Channel the status message lives in
    channel_id: String,
}

impl MessageSink {
    /// Creates a sink targeting `channel_id`
    pub fn new(platform: Arc<dyn ChatPlatform>, channel_id: impl Into<String>) -> Self {
        MessageSink {
            platform,
            channel_id: channel_id.into(),
        }
    }

    /// Waits for the chat session to be usable and returns the bot's tag
    pub async fn ready(&self) -> Result<String, BotError> {
        self.platform.current_user().await
    }

    /// Publishes `rendered`, creating or editing the status message
    ///
    /// With no `current` handle a new message is created and its handle
    /// returned. Otherwise the existing message is looked up and edited in
    /// place, and the same handle is returned. Either way exactly one write
    /// is issued.
    ///
    /// # Errors
    /// * `BotError::MessageNotFound` - `current` refers to a deleted message
    /// * `BotError::ChatPlatform` - any other chat API failure
    pub async fn publish(
        &self,
        current: Option<&MessageHandle>,
        rendered: &RenderedMessage,
    ) -> Result<MessageHandle, BotError> {
        let content = MessageContent::Embed(rendered.clone());

        match current {
            None => {
                let handle = self
                    .platform
                    .send_message(&self.channel_id, &content)
                    .await?;
                log::info!("Created status message {}", handle);
                Ok(handle)
            }
            Some(handle) => {
                let existing = self
                    .platform
                    .fetch_message(&self.channel_id, handle)
                    .await?;
                self.platform
                    .edit_message(&self.channel_id, &existing, &content)
                    .await?;
                log::debug!("Edited status message {}", existing);
                Ok(existing)
            }
        }
    }

    /// Posts a plain-text notice to the channel
    pub async fn notify(&self, text: &str) -> Result<(), BotError> {
        self.platform
            .send_message(&self.channel_id, &MessageContent::Text(text.to_string()))
            .await?;
        Ok(())
    }
}
