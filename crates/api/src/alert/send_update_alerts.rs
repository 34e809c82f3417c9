use super::dispatcher::{dispatch, DispatchReport};
use crate::shared::usecase::UseCase;
use community_alerts_domain::{AlertKind, AlertMessage, Event, SubscriptionStatus};
use community_alerts_infra::AlertsContext;
use tracing::error;

/// Tells the members attending an `Event` that it has changed
#[derive(Debug)]
pub struct SendUpdateAlertsUseCase {
    pub event: Event,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendUpdateAlertsUseCase {
    type Response = DispatchReport;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.now();
        let member_ids = ctx
            .repos
            .event_alert_subscriptions
            .find_by_event_and_status(&self.event.id, SubscriptionStatus::Subscribed)
            .await
            .map_err(|e| {
                error!("Unable to load subscribers of event: {}. Error: {:?}", self.event.id, e);
                UseCaseErrors::StorageError
            })?
            .into_iter()
            .map(|s| s.member_id)
            .collect::<Vec<_>>();
        if member_ids.is_empty() {
            return Ok(Default::default());
        }
        let members = ctx
            .repos
            .members
            .find_many(&member_ids)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let occurrence = self.event.effective_occurrence(now).unwrap_or(self.event.date);
        let message = AlertMessage::new(
            &self.event,
            occurrence,
            AlertKind::Update,
            now,
            &ctx.config.alert_schedule.timezone,
        );
        let (report, _) = dispatch(ctx, &members, &message).await;

        Ok(report)
    }
}
