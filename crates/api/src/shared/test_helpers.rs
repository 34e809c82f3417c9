use chrono::{DateTime, Duration, Utc};
use community_alerts_domain::{
    AlertResponse, AlertSchedule, Event, EventAlertSubscription, Member, ScheduledTime,
    SubscriptionStatus, ID,
};
use community_alerts_infra::{
    AlertsContext, IEventAlertSubscriptionRepo, ISys, InMemoryMessagingChannel,
    SubscriptionStoreError,
};
use std::sync::Arc;

pub struct StaticTimeSys(pub DateTime<Utc>);
impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

/// In-memory context frozen at `now`, alerting in UTC with the default thresholds
pub fn setup_context(now: DateTime<Utc>) -> (AlertsContext, Arc<InMemoryMessagingChannel>) {
    let messenger = Arc::new(InMemoryMessagingChannel::new());
    let mut ctx = AlertsContext::create_inmemory();
    ctx.sys = Arc::new(StaticTimeSys(now));
    ctx.messenger = messenger.clone();
    ctx.config.reminder_interval = Duration::minutes(1440);
    ctx.config.telegram_main_chat_id = -100;
    ctx.config.alert_dispatch_concurrency = 4;
    ctx.config.alert_schedule = AlertSchedule {
        first: Duration::minutes(10080),
        second: Duration::minutes(1440),
        third: Duration::minutes(60),
        scheduled_time: ScheduledTime::default(),
        timezone: chrono_tz::UTC,
    };
    (ctx, messenger)
}

pub fn with_clock(ctx: &AlertsContext, now: DateTime<Utc>) -> AlertsContext {
    let mut ctx = ctx.clone();
    ctx.sys = Arc::new(StaticTimeSys(now));
    ctx
}

pub async fn insert_members(ctx: &AlertsContext, members: &[Member]) {
    for member in members {
        ctx.repos.members.insert(member).await.unwrap();
    }
}

pub async fn insert_event(ctx: &AlertsContext, event: &Event) {
    ctx.repos.events.insert(event).await.unwrap();
}

/// Delegates to the wrapped repo, except that every subscription lookup by
/// event and status fails for `broken_event`
pub struct BrokenEventSubscriptions {
    inner: Arc<dyn IEventAlertSubscriptionRepo>,
    broken_event: ID,
}

#[async_trait::async_trait]
impl IEventAlertSubscriptionRepo for BrokenEventSubscriptions {
    async fn insert(&self, s: &EventAlertSubscription) -> Result<(), SubscriptionStoreError> {
        self.inner.insert(s).await
    }

    async fn find(&self, event_id: &ID, member_id: &ID) -> Option<EventAlertSubscription> {
        self.inner.find(event_id, member_id).await
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<EventAlertSubscription>> {
        self.inner.find_by_event(event_id).await
    }

    async fn find_by_event_and_status(
        &self,
        event_id: &ID,
        status: SubscriptionStatus,
    ) -> anyhow::Result<Vec<EventAlertSubscription>> {
        if *event_id == self.broken_event {
            anyhow::bail!("connection to the subscription store was lost");
        }
        self.inner.find_by_event_and_status(event_id, status).await
    }

    async fn respond(
        &self,
        event_id: &ID,
        member_id: &ID,
        response: AlertResponse,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<EventAlertSubscription>> {
        self.inner.respond(event_id, member_id, response, now).await
    }

    async fn mark_reminder_sent(
        &self,
        subscription_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.inner.mark_reminder_sent(subscription_id, now).await
    }

    async fn expire_pending(&self, subscription_id: &ID, now: DateTime<Utc>) -> anyhow::Result<bool> {
        self.inner.expire_pending(subscription_id, now).await
    }
}

/// Same context, but loading the subscriptions of `event_id` fails
pub fn with_broken_event(ctx: &AlertsContext, event_id: &ID) -> AlertsContext {
    let mut ctx = ctx.clone();
    ctx.repos.event_alert_subscriptions = Arc::new(BrokenEventSubscriptions {
        inner: ctx.repos.event_alert_subscriptions.clone(),
        broken_event: event_id.clone(),
    });
    ctx
}
