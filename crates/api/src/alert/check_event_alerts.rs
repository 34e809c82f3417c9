use super::dispatcher::dispatch;
use crate::shared::usecase::UseCase;
use chrono::{DateTime, Duration, Utc};
use community_alerts_domain::{
    AlertKind, AlertMessage, AlertTier, AlertTrigger, Event, EventAlertState,
    EventAlertSubscription, PendingAction, SubscriptionStatus, ID,
};
use community_alerts_infra::{AlertsContext, DeliveryError};
use tracing::{debug, error, info};

/// One pass of the alert scheduler over every event that is not over yet
#[derive(Debug)]
pub struct CheckEventAlertsUseCase {}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UseCaseResponse {
    pub events_checked: usize,
    pub reprompted: usize,
    pub expired: usize,
    pub tier_alerts_sent: Vec<(ID, AlertTier)>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckEventAlertsUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.now();
        let events = ctx
            .repos
            .events
            .find_alert_candidates(now - Duration::minutes(1))
            .await
            .map_err(|e| {
                error!("Unable to load events for alerting. Error: {:?}", e);
                UseCaseErrors::StorageError
            })?;

        let mut res = UseCaseResponse {
            events_checked: events.len(),
            ..Default::default()
        };
        for event in &events {
            let (reprompted, expired) = maintain_pending_subscriptions(ctx, event, now).await;
            res.reprompted += reprompted;
            res.expired += expired;

            if let Some(tier) = send_tier_alert(ctx, event, now).await {
                res.tier_alerts_sent.push((event.id.clone(), tier));
            }
        }

        Ok(res)
    }
}

/// Re-prompts members who never answered the initial alert and unsubscribes
/// the ones who did not answer the re-prompt either.
/// Returns the number of (re-prompted, expired) subscriptions.
async fn maintain_pending_subscriptions(
    ctx: &AlertsContext,
    event: &Event,
    now: DateTime<Utc>,
) -> (usize, usize) {
    let subscriptions = &ctx.repos.event_alert_subscriptions;
    let pending = match subscriptions
        .find_by_event_and_status(&event.id, SubscriptionStatus::Pending)
        .await
    {
        Ok(pending) => pending,
        Err(e) => {
            error!(
                "Unable to load pending subscriptions of event: {}. Error: {:?}",
                event.id, e
            );
            return (0, 0);
        }
    };

    let mut expired = 0;
    let mut to_reprompt: Vec<EventAlertSubscription> = Vec::new();
    for s in pending {
        match s.pending_action(now, ctx.config.reminder_interval) {
            PendingAction::Expire => match subscriptions.expire_pending(&s.id, now).await {
                Ok(true) => {
                    info!(
                        "Member: {} never answered about event: {}, unsubscribed",
                        s.member_id, event.id
                    );
                    expired += 1;
                }
                Ok(false) => {}
                Err(e) => error!("Unable to expire subscription: {}. Error: {:?}", s.id, e),
            },
            PendingAction::Reprompt => to_reprompt.push(s),
            PendingAction::Wait => {}
        }
    }
    if to_reprompt.is_empty() {
        return (0, expired);
    }

    let member_ids = to_reprompt
        .iter()
        .map(|s| s.member_id.clone())
        .collect::<Vec<_>>();
    let members = match ctx.repos.members.find_many(&member_ids).await {
        Ok(members) => members,
        Err(e) => {
            error!("Unable to load members to re-prompt. Error: {:?}", e);
            return (0, expired);
        }
    };

    let occurrence = event.effective_occurrence(now).unwrap_or(event.date);
    let message = AlertMessage::new(
        event,
        occurrence,
        AlertKind::Initial,
        now,
        &ctx.config.alert_schedule.timezone,
    );
    let (_, results) = dispatch(ctx, &members, &message).await;

    // Transient failures are retried on the next pass, everyone else counts as prompted
    let retry = results
        .iter()
        .filter(|(_, res)| matches!(res, Err(e) if !matches!(e, DeliveryError::RecipientUnreachable(_))))
        .map(|(member, _)| member.id.clone())
        .collect::<Vec<_>>();

    let mut reprompted = 0;
    for s in to_reprompt.iter().filter(|s| !retry.contains(&s.member_id)) {
        match subscriptions.mark_reminder_sent(&s.id, now).await {
            Ok(true) => reprompted += 1,
            Ok(false) => {}
            Err(e) => error!(
                "Unable to stamp re-prompt of subscription: {}. Error: {:?}",
                s.id, e
            ),
        }
    }

    (reprompted, expired)
}

/// Sends the reminder tier that is due for `event`, if any, to its subscribers
async fn send_tier_alert(ctx: &AlertsContext, event: &Event, now: DateTime<Utc>) -> Option<AlertTier> {
    let (tier, occurrence) =
        match EventAlertState::evaluate(event, &ctx.config.alert_schedule, AlertTrigger::Tick, now) {
            EventAlertState::TierDue { tier, occurrence } => (tier, occurrence),
            EventAlertState::TierSent { tier } => {
                debug!("The {} alert of event: {} was already sent", tier, event.id);
                return None;
            }
            EventAlertState::AwaitingTier | EventAlertState::NeedsInitialAlert => return None,
        };

    let subscribed = match ctx
        .repos
        .event_alert_subscriptions
        .find_by_event_and_status(&event.id, SubscriptionStatus::Subscribed)
        .await
    {
        Ok(subscribed) => subscribed,
        Err(e) => {
            error!(
                "Unable to load subscribers of event: {}. Error: {:?}",
                event.id, e
            );
            return None;
        }
    };
    let member_ids = subscribed
        .into_iter()
        .map(|s| s.member_id)
        .collect::<Vec<_>>();
    let members = match ctx.repos.members.find_many(&member_ids).await {
        Ok(members) => members,
        Err(e) => {
            error!("Unable to load subscribed members. Error: {:?}", e);
            return None;
        }
    };

    info!(
        "Sending {} alert for event: {}, occurrence: {}",
        tier, event.id, occurrence
    );
    let kind = match tier {
        AlertTier::Start => AlertKind::Starting,
        _ => AlertKind::Reminder,
    };
    let message = AlertMessage::new(
        event,
        occurrence,
        kind,
        now,
        &ctx.config.alert_schedule.timezone,
    );
    let (report, _) = dispatch(ctx, &members, &message).await;
    debug!("Alert dispatch for event: {} finished: {:?}", event.id, report);

    if let Err(e) = ctx
        .repos
        .events
        .set_last_repeating_alert_sent_at(&event.id, now)
        .await
    {
        error!(
            "Unable to store the last alert time of event: {}. Error: {:?}",
            event.id, e
        );
    }

    Some(tier)
}
