use crate::alert::{AlertScheduler, EventAlertHooks};
use crate::error::AlertsError;
use actix_web::{web, HttpResponse};
use community_alerts_api_structs::event_created::*;
use community_alerts_infra::AlertsContext;

/// Hook for events that were written by another service
pub async fn event_created_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlertsContext>,
    scheduler: web::Data<AlertScheduler>,
) -> Result<HttpResponse, AlertsError> {
    let event = match ctx.repos.events.find(&path_params.event_id).await {
        Some(event) => event,
        None => {
            return Err(AlertsError::NotFound(format!(
                "The event with id: {}, was not found.",
                path_params.event_id
            )))
        }
    };

    let alerted_members = scheduler.on_event_created(&event).await;
    Ok(HttpResponse::Ok().json(APIResponse::new(event, alerted_members)))
}
