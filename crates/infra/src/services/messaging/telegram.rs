use super::{DeliveryError, IMessagingChannel};
use community_alerts_domain::CallbackButton;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};

fn keyboard(buttons: &[CallbackButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![buttons
        .iter()
        .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.callback_data.clone()))
        .collect::<Vec<_>>()])
}

fn is_unreachable(error: &ApiError) -> bool {
    matches!(
        error,
        ApiError::BotBlocked
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::UserDeactivated
            | ApiError::CantInitiateConversation
            | ApiError::CantTalkWithBots
            | ApiError::ChatNotFound
            | ApiError::GroupDeactivated
    )
}

impl From<RequestError> for DeliveryError {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::Api(api) if is_unreachable(&api) => Self::RecipientUnreachable(api.to_string()),
            RequestError::Api(api) => Self::Api(api.to_string()),
            RequestError::Network(e) if e.is_timeout() => Self::Timeout,
            RequestError::Network(e) => Self::Network(e.to_string()),
            other => Self::Api(other.to_string()),
        }
    }
}

/// Telegram Bot API client. Errors are returned to the caller, which decides
/// how loud to log them.
pub struct TelegramBotApi {
    bot: Bot,
}

impl TelegramBotApi {
    pub fn new(token: String, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }
}

#[async_trait::async_trait]
impl IMessagingChannel for TelegramBotApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[CallbackButton],
    ) -> Result<(), DeliveryError> {
        let request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if buttons.is_empty() {
            request.await?;
        } else {
            request.reply_markup(keyboard(buttons)).await?;
        }
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<(), DeliveryError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_query_id.to_string()))
            .text(text)
            .await?;
        Ok(())
    }

    async fn clear_buttons(&self, chat_id: i64, message_id: i32) -> Result<(), DeliveryError> {
        // Without a markup the keyboard is removed
        match self
            .bot
            .edit_message_reply_markup(ChatId(chat_id), MessageId(message_id))
            .await
        {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classifies_api_errors() {
        for unreachable in [ApiError::BotBlocked, ApiError::ChatNotFound, ApiError::UserDeactivated] {
            assert!(matches!(
                DeliveryError::from(RequestError::Api(unreachable)),
                DeliveryError::RecipientUnreachable(_)
            ));
        }
        assert!(matches!(
            DeliveryError::from(RequestError::Api(ApiError::Unknown(
                "Bad Request: message is too long".into()
            ))),
            DeliveryError::Api(_)
        ));
        assert!(matches!(
            DeliveryError::from(RequestError::Api(ApiError::MessageNotModified)),
            DeliveryError::Api(_)
        ));
    }

    #[test]
    fn renders_buttons_in_one_row() {
        let buttons = vec![
            CallbackButton {
                text: "Yes".into(),
                callback_data: "event_attend:1".into(),
            },
            CallbackButton {
                text: "No".into(),
                callback_data: "event_decline:1".into(),
            },
        ];
        let json = serde_json::to_value(keyboard(&buttons)).unwrap();
        assert_eq!(json["inline_keyboard"].as_array().unwrap().len(), 1);
        assert_eq!(json["inline_keyboard"][0].as_array().unwrap().len(), 2);
        assert_eq!(json["inline_keyboard"][0][1]["callback_data"], "event_decline:1");
    }
}
