mod messaging;

pub use messaging::{
    DeliveryError, IMessagingChannel, InMemoryMessagingChannel, LogOnlyMessagingChannel,
    SentMessage, TelegramBotApi,
};
