use super::{DeliveryError, IMessagingChannel};
use community_alerts_domain::CallbackButton;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub buttons: Vec<CallbackButton>,
}

/// Records everything that would have been sent. Chats marked as
/// unreachable fail like a member who blocked the bot.
/// Hanging chats never get an answer.
pub struct InMemoryMessagingChannel {
    sent: Mutex<Vec<SentMessage>>,
    answered_callbacks: Mutex<Vec<(String, String)>>,
    cleared_buttons: Mutex<Vec<(i64, i32)>>,
    unreachable_chats: Mutex<Vec<i64>>,
    failing_chats: Mutex<Vec<i64>>,
    hanging_chats: Mutex<Vec<i64>>,
}

impl InMemoryMessagingChannel {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            answered_callbacks: Mutex::new(Vec::new()),
            cleared_buttons: Mutex::new(Vec::new()),
            unreachable_chats: Mutex::new(Vec::new()),
            failing_chats: Mutex::new(Vec::new()),
            hanging_chats: Mutex::new(Vec::new()),
        }
    }

    pub fn mark_unreachable(&self, chat_id: i64) {
        self.unreachable_chats.lock().unwrap().push(chat_id);
    }

    pub fn mark_failing(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().push(chat_id);
    }

    pub fn mark_hanging(&self, chat_id: i64) {
        self.hanging_chats.lock().unwrap().push(chat_id);
    }

    /// Makes a failing or hanging chat behave normally again
    pub fn recover(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().retain(|c| *c != chat_id);
        self.hanging_chats.lock().unwrap().retain(|c| *c != chat_id);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect()
    }

    pub fn answered_callbacks(&self) -> Vec<(String, String)> {
        self.answered_callbacks.lock().unwrap().clone()
    }

    pub fn cleared_buttons(&self) -> Vec<(i64, i32)> {
        self.cleared_buttons.lock().unwrap().clone()
    }

    fn check_reachable(&self, chat_id: i64) -> Result<(), DeliveryError> {
        if self.unreachable_chats.lock().unwrap().contains(&chat_id) {
            return Err(DeliveryError::RecipientUnreachable(format!(
                "chat not found: {}",
                chat_id
            )));
        }
        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(DeliveryError::Network(format!(
                "connection reset while sending to chat: {}",
                chat_id
            )));
        }
        Ok(())
    }

    fn is_hanging(&self, chat_id: i64) -> bool {
        self.hanging_chats.lock().unwrap().contains(&chat_id)
    }
}

#[async_trait::async_trait]
impl IMessagingChannel for InMemoryMessagingChannel {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[CallbackButton],
    ) -> Result<(), DeliveryError> {
        if self.is_hanging(chat_id) {
            std::future::pending::<()>().await;
        }
        self.check_reachable(chat_id)?;
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<(), DeliveryError> {
        self.answered_callbacks
            .lock()
            .unwrap()
            .push((callback_query_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn clear_buttons(&self, chat_id: i64, message_id: i32) -> Result<(), DeliveryError> {
        self.check_reachable(chat_id)?;
        self.cleared_buttons
            .lock()
            .unwrap()
            .push((chat_id, message_id));
        Ok(())
    }
}
