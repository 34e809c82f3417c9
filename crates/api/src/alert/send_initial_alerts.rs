use super::dispatcher::{dispatch, DispatchReport};
use crate::shared::usecase::UseCase;
use community_alerts_domain::{AlertKind, AlertMessage, Event, EventAlertSubscription, Member};
use community_alerts_infra::{AlertsContext, SubscriptionStoreError};
use tracing::{debug, error, warn};

/// Subscribes every community member to a new `Event` as pending and asks
/// each of them whether they attend
#[derive(Debug)]
pub struct SendInitialAlertsUseCase {
    pub event: Event,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UseCaseResponse {
    pub subscriptions_created: usize,
    pub already_subscribed: usize,
    pub report: DispatchReport,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendInitialAlertsUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.now();
        let mut res = UseCaseResponse::default();

        let members = ctx
            .repos
            .members
            .find_community_subscribers()
            .await
            .map_err(|e| {
                error!("Unable to load community subscribers. Error: {:?}", e);
                UseCaseErrors::StorageError
            })?;

        let mut recipients: Vec<Member> = Vec::with_capacity(members.len());
        for member in members {
            if !member.has_linked_chat() {
                continue;
            }
            let subscription = EventAlertSubscription::new(self.event.id.clone(), member.id.clone(), now);
            match ctx.repos.event_alert_subscriptions.insert(&subscription).await {
                Ok(_) => {
                    res.subscriptions_created += 1;
                    recipients.push(member);
                }
                Err(SubscriptionStoreError::AlreadyExists) => {
                    debug!(
                        "Member: {} is already subscribed to event: {}",
                        member.id, self.event.id
                    );
                    res.already_subscribed += 1;
                }
                Err(SubscriptionStoreError::Storage(e)) => {
                    warn!(
                        "Unable to subscribe member: {} to event: {}. Error: {:?}",
                        member.id, self.event.id, e
                    );
                }
            }
        }

        let occurrence = self.event.effective_occurrence(now).unwrap_or(self.event.date);
        let message = AlertMessage::new(
            &self.event,
            occurrence,
            AlertKind::Initial,
            now,
            &ctx.config.alert_schedule.timezone,
        );
        let (report, _) = dispatch(ctx, &recipients, &message).await;
        res.report = report;

        Ok(res)
    }
}
