use serde::{Deserialize, Serialize};

pub mod telegram_webhook {
    use super::*;

    /// A bot update as the platform delivers it. Only callback queries are
    /// acted on, every other kind is acknowledged and dropped.
    pub type RequestBody = teloxide::types::Update;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub ok: bool,
    }
}
