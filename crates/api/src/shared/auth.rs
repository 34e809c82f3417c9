use crate::error::AlertsError;
use actix_web::HttpRequest;
use community_alerts_infra::AlertsContext;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Only the bot platform knows the secret the webhook was registered with
pub fn protect_telegram_webhook(req: &HttpRequest, ctx: &AlertsContext) -> Result<(), AlertsError> {
    let secret = match req.headers().get(TELEGRAM_SECRET_HEADER) {
        Some(secret) => match secret.to_str() {
            Ok(secret) => secret,
            Err(_) => {
                return Err(AlertsError::Unauthorized(
                    "Malformed webhook secret provided".to_string(),
                ))
            }
        },
        None => {
            return Err(AlertsError::Unauthorized(format!(
                "Unable to find the webhook secret in {} header",
                TELEGRAM_SECRET_HEADER
            )))
        }
    };

    if !secrets_match(secret, &ctx.config.telegram_webhook_secret) {
        return Err(AlertsError::Unauthorized(
            "Invalid webhook secret provided".to_string(),
        ));
    }
    Ok(())
}

/// Compares HMAC tags of both secrets, the tag check runs in constant time
fn secrets_match(presented: &str, expected: &str) -> bool {
    let tag = |secret: &str| {
        Hmac::<Sha256>::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(secret.as_bytes());
            mac
        })
    };
    match (tag(presented), tag(expected)) {
        (Ok(presented), Ok(expected)) => presented
            .verify_slice(&expected.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}
