use crate::alert::handle_alert_response::{HandleAlertResponseUseCase, UseCaseErrors};
use crate::alert::with_send_timeout;
use crate::error::AlertsError;
use crate::shared::{auth::protect_telegram_webhook, usecase::execute};
use actix_web::{web, HttpRequest, HttpResponse};
use community_alerts_api_structs::telegram_webhook::*;
use community_alerts_domain::AlertResponse;
use community_alerts_infra::AlertsContext;
use teloxide::types::{CallbackQuery, UpdateKind};
use tracing::warn;

const UNKNOWN_BUTTON_TEXT: &str = "This button is not supported anymore";
const UNKNOWN_MEMBER_TEXT: &str = "We could not find your community profile";
const UNKNOWN_SUBSCRIPTION_TEXT: &str = "This event is not available anymore";
const STORAGE_ERROR_TEXT: &str = "Something went wrong, please try again later";

/// Always answers 200 to an authenticated update so that the bot platform
/// does not redeliver it
pub async fn telegram_webhook_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<AlertsContext>,
) -> Result<HttpResponse, AlertsError> {
    protect_telegram_webhook(&http_req, &ctx)?;

    if let UpdateKind::CallbackQuery(callback) = body.into_inner().kind {
        handle_callback_query(callback, &ctx).await;
    }

    Ok(HttpResponse::Ok().json(APIResponse { ok: true }))
}

async fn handle_callback_query(callback: CallbackQuery, ctx: &AlertsContext) {
    let telegram_id = callback.from.id.0 as i64;
    let parsed = callback
        .data
        .as_deref()
        .and_then(AlertResponse::parse_callback_data);

    let answer = match parsed {
        None => {
            warn!(
                "Unknown callback data: {:?} from telegram user: {}",
                callback.data, telegram_id
            );
            UNKNOWN_BUTTON_TEXT
        }
        Some((response, event_id)) => {
            let usecase = HandleAlertResponseUseCase {
                telegram_id,
                event_id,
                response,
            };
            match execute(usecase, ctx).await {
                Ok(_) => {
                    if let Some(message) = callback.regular_message() {
                        let clear = ctx
                            .messenger
                            .clear_buttons(message.chat.id.0, message.id.0);
                        if let Err(e) = with_send_timeout(ctx, clear).await {
                            warn!(
                                "Unable to clear the buttons of message: {} in chat: {}. Error: {:?}",
                                message.id.0, message.chat.id.0, e
                            );
                        }
                    }
                    response.acknowledgement()
                }
                Err(UseCaseErrors::MemberNotFound(_)) => UNKNOWN_MEMBER_TEXT,
                Err(UseCaseErrors::SubscriptionNotFound(_)) => UNKNOWN_SUBSCRIPTION_TEXT,
                Err(UseCaseErrors::StorageError) => STORAGE_ERROR_TEXT,
            }
        }
    };

    let answer_call = ctx.messenger.answer_callback(&callback.id.0, answer);
    if let Err(e) = with_send_timeout(ctx, answer_call).await {
        warn!("Unable to answer callback: {}. Error: {:?}", callback.id.0, e);
    }
}
