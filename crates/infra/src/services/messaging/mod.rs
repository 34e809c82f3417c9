mod inmemory;
mod telegram;

use community_alerts_domain::CallbackButton;
pub use inmemory::{InMemoryMessagingChannel, SentMessage};
pub use telegram::TelegramBotApi;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The member blocked the bot or the chat does not exist anymore
    #[error("Recipient is unreachable: {0}")]
    RecipientUnreachable(String),
    #[error("Timed out while delivering the message")]
    Timeout,
    #[error("Messaging API rejected the request: {0}")]
    Api(String),
    #[error("Network error while delivering the message: {0}")]
    Network(String),
}

/// Outbound side of the chat platform the community lives on
#[async_trait::async_trait]
pub trait IMessagingChannel: Send + Sync {
    /// Sends an HTML formatted message, `buttons` are rendered as one row of
    /// inline callback buttons
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[CallbackButton],
    ) -> Result<(), DeliveryError>;
    async fn answer_callback(&self, callback_query_id: &str, text: &str)
        -> Result<(), DeliveryError>;
    /// Removes the inline buttons of an already sent message
    async fn clear_buttons(&self, chat_id: i64, message_id: i32) -> Result<(), DeliveryError>;
}

/// Used when no bot token is configured
pub struct LogOnlyMessagingChannel {}

#[async_trait::async_trait]
impl IMessagingChannel for LogOnlyMessagingChannel {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[CallbackButton],
    ) -> Result<(), DeliveryError> {
        info!(
            "Messaging is disabled, dropping message to chat: {} with {} buttons: {}",
            chat_id,
            buttons.len(),
            text
        );
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<(), DeliveryError> {
        info!(
            "Messaging is disabled, dropping answer to callback: {}: {}",
            callback_query_id, text
        );
        Ok(())
    }

    async fn clear_buttons(&self, chat_id: i64, message_id: i32) -> Result<(), DeliveryError> {
        info!(
            "Messaging is disabled, not clearing buttons of message: {} in chat: {}",
            message_id, chat_id
        );
        Ok(())
    }
}
