use super::{IEventAlertSubscriptionRepo, SubscriptionStoreError};
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use community_alerts_domain::{AlertResponse, EventAlertSubscription, SubscriptionStatus, ID};

pub struct InMemoryEventAlertSubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<EventAlertSubscription>>,
}

impl InMemoryEventAlertSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventAlertSubscriptionRepo for InMemoryEventAlertSubscriptionRepo {
    async fn insert(&self, s: &EventAlertSubscription) -> Result<(), SubscriptionStoreError> {
        let inserted = insert_unless(s, &self.subscriptions, |existing| {
            existing.event_id == s.event_id && existing.member_id == s.member_id
        });
        if inserted {
            Ok(())
        } else {
            Err(SubscriptionStoreError::AlreadyExists)
        }
    }

    async fn find(&self, event_id: &ID, member_id: &ID) -> Option<EventAlertSubscription> {
        find_by(&self.subscriptions, |s| {
            s.event_id == *event_id && s.member_id == *member_id
        })
        .into_iter()
        .next()
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<EventAlertSubscription>> {
        Ok(find_by(&self.subscriptions, |s| s.event_id == *event_id))
    }

    async fn find_by_event_and_status(
        &self,
        event_id: &ID,
        status: SubscriptionStatus,
    ) -> anyhow::Result<Vec<EventAlertSubscription>> {
        Ok(find_by(&self.subscriptions, |s| {
            s.event_id == *event_id && s.status == status
        }))
    }

    async fn respond(
        &self,
        event_id: &ID,
        member_id: &ID,
        response: AlertResponse,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<EventAlertSubscription>> {
        let updated = update_many(
            &self.subscriptions,
            |s| s.event_id == *event_id && s.member_id == *member_id,
            |s| s.respond(response, now),
        );
        Ok(updated.into_iter().next())
    }

    async fn mark_reminder_sent(
        &self,
        subscription_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let updated = update_many(
            &self.subscriptions,
            |s| {
                s.id == *subscription_id
                    && s.status == SubscriptionStatus::Pending
                    && s.reminder_sent_at.is_none()
            },
            |s| {
                s.reminder_sent_at = Some(now);
                s.updated_at = now;
            },
        );
        Ok(!updated.is_empty())
    }

    async fn expire_pending(&self, subscription_id: &ID, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let updated = update_many(
            &self.subscriptions,
            |s| s.id == *subscription_id && s.status == SubscriptionStatus::Pending,
            |s| {
                s.expire(now);
            },
        );
        Ok(!updated.is_empty())
    }
}
