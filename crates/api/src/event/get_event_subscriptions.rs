use crate::error::AlertsError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use community_alerts_api_structs::get_event_subscriptions::*;
use community_alerts_domain::{EventAlertSubscription, ID};
use community_alerts_infra::AlertsContext;

pub async fn get_event_subscriptions_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlertsContext>,
) -> Result<HttpResponse, AlertsError> {
    let usecase = GetEventSubscriptionsUseCase {
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscriptions| HttpResponse::Ok().json(APIResponse::new(subscriptions)))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(event_id) => AlertsError::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseErrors::StorageError => AlertsError::InternalError,
        })
}

#[derive(Debug)]
pub struct GetEventSubscriptionsUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventSubscriptionsUseCase {
    type Response = Vec<EventAlertSubscription>;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        if ctx.repos.events.find(&self.event_id).await.is_none() {
            return Err(UseCaseErrors::NotFound(self.event_id.clone()));
        }

        ctx.repos
            .event_alert_subscriptions
            .find_by_event(&self.event_id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)
    }
}
