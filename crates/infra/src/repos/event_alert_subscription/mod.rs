mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use community_alerts_domain::{AlertResponse, EventAlertSubscription, SubscriptionStatus, ID};
pub use inmemory::InMemoryEventAlertSubscriptionRepo;
pub use postgres::PostgresEventAlertSubscriptionRepo;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubscriptionStoreError {
    #[error("A subscription for this event and member already exists")]
    AlreadyExists,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait IEventAlertSubscriptionRepo: Send + Sync {
    /// Fails with `AlreadyExists` when the (event, member) pair is taken
    async fn insert(&self, s: &EventAlertSubscription) -> Result<(), SubscriptionStoreError>;
    async fn find(&self, event_id: &ID, member_id: &ID) -> Option<EventAlertSubscription>;
    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<EventAlertSubscription>>;
    async fn find_by_event_and_status(
        &self,
        event_id: &ID,
        status: SubscriptionStatus,
    ) -> anyhow::Result<Vec<EventAlertSubscription>>;
    /// Applies a member answer to the (event, member) subscription and returns
    /// it, `None` when there is no such subscription
    async fn respond(
        &self,
        event_id: &ID,
        member_id: &ID,
        response: AlertResponse,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<EventAlertSubscription>>;
    /// Stamps `reminder_sent_at` if the subscription is still pending and was
    /// never re-prompted. Returns whether it was stamped.
    async fn mark_reminder_sent(&self, subscription_id: &ID, now: DateTime<Utc>)
        -> anyhow::Result<bool>;
    /// Moves a pending subscription to unsubscribed. Returns whether it was pending.
    async fn expire_pending(&self, subscription_id: &ID, now: DateTime<Utc>) -> anyhow::Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn rejects_duplicate_pair() {
        let repo = InMemoryEventAlertSubscriptionRepo::new();
        let event_id = ID::new();
        let member_id = ID::new();

        let s = EventAlertSubscription::new(event_id.clone(), member_id.clone(), now());
        assert!(repo.insert(&s).await.is_ok());
        let duplicate = EventAlertSubscription::new(event_id.clone(), member_id.clone(), now());
        assert!(matches!(
            repo.insert(&duplicate).await,
            Err(SubscriptionStoreError::AlreadyExists)
        ));
        assert_eq!(repo.find_by_event(&event_id).await.unwrap().len(), 1);

        let other_member = EventAlertSubscription::new(event_id.clone(), ID::new(), now());
        assert!(repo.insert(&other_member).await.is_ok());
    }

    #[tokio::test]
    async fn conditional_updates() {
        let repo = InMemoryEventAlertSubscriptionRepo::new();
        let s = EventAlertSubscription::new(ID::new(), ID::new(), now());
        repo.insert(&s).await.unwrap();

        let later = now() + Duration::days(1);
        assert!(repo.mark_reminder_sent(&s.id, later).await.unwrap());
        // Only stamped once
        assert!(!repo.mark_reminder_sent(&s.id, later).await.unwrap());
        let stored = repo.find(&s.event_id, &s.member_id).await.unwrap();
        assert_eq!(stored.reminder_sent_at, Some(later));

        let updated = repo
            .respond(&s.event_id, &s.member_id, AlertResponse::Attend, later)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SubscriptionStatus::Subscribed);

        // Answered subscriptions never expire
        assert!(!repo.expire_pending(&s.id, later).await.unwrap());
        assert_eq!(
            repo.find_by_event_and_status(&s.event_id, SubscriptionStatus::Subscribed)
                .await
                .unwrap()
                .len(),
            1
        );

        assert!(repo
            .respond(&ID::new(), &s.member_id, AlertResponse::Attend, later)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn expires_pending() {
        let repo = InMemoryEventAlertSubscriptionRepo::new();
        let s = EventAlertSubscription::new(ID::new(), ID::new(), now());
        repo.insert(&s).await.unwrap();

        assert!(repo.expire_pending(&s.id, now()).await.unwrap());
        let stored = repo.find(&s.event_id, &s.member_id).await.unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Unsubscribed);
        assert!(!repo.expire_pending(&s.id, now()).await.unwrap());
    }
}
