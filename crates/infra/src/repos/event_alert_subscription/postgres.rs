use super::{IEventAlertSubscriptionRepo, SubscriptionStoreError};
use chrono::{DateTime, Utc};
use community_alerts_domain::{AlertResponse, EventAlertSubscription, SubscriptionStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresEventAlertSubscriptionRepo {
    pool: PgPool,
}

impl PostgresEventAlertSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventAlertSubscriptionRaw {
    subscription_uid: Uuid,
    event_uid: Uuid,
    member_uid: Uuid,
    status: String,
    reminder_sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventAlertSubscriptionRaw> for EventAlertSubscription {
    fn from(raw: EventAlertSubscriptionRaw) -> Self {
        let status = raw.status.parse().unwrap_or_else(|_| {
            warn!(
                "Subscription: {} has unknown status: {}, reading it as unsubscribed",
                raw.subscription_uid, raw.status
            );
            SubscriptionStatus::Unsubscribed
        });
        EventAlertSubscription {
            id: raw.subscription_uid.into(),
            event_id: raw.event_uid.into(),
            member_id: raw.member_uid.into(),
            status,
            reminder_sent_at: raw.reminder_sent_at,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

#[async_trait::async_trait]
impl IEventAlertSubscriptionRepo for PostgresEventAlertSubscriptionRepo {
    async fn insert(&self, s: &EventAlertSubscription) -> Result<(), SubscriptionStoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO event_alert_subscriptions(
                subscription_uid,
                event_uid,
                member_uid,
                status,
                reminder_sent_at,
                created_at,
                updated_at
            )
            VALUES($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (event_uid, member_uid) DO NOTHING
            "#,
        )
        .bind(s.id.inner_ref())
        .bind(s.event_id.inner_ref())
        .bind(s.member_id.inner_ref())
        .bind(s.status.as_str())
        .bind(s.reminder_sent_at)
        .bind(s.created_at)
        .bind(s.updated_at)
        .execute(&self.pool)
        .await
        .map_err(anyhow::Error::new)?;

        if res.rows_affected() == 0 {
            return Err(SubscriptionStoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn find(&self, event_id: &ID, member_id: &ID) -> Option<EventAlertSubscription> {
        match sqlx::query_as::<_, EventAlertSubscriptionRaw>(
            r#"
            SELECT * FROM event_alert_subscriptions AS s
            WHERE s.event_uid = $1 AND s.member_uid = $2
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(member_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(s) => s.map(|s| s.into()),
            Err(e) => {
                error!(
                    "Unable to find subscription of member: {} to event: {}. Error: {:?}",
                    member_id, event_id, e
                );
                None
            }
        }
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<EventAlertSubscription>> {
        let subscriptions = sqlx::query_as::<_, EventAlertSubscriptionRaw>(
            r#"
            SELECT * FROM event_alert_subscriptions AS s
            WHERE s.event_uid = $1
            ORDER BY s.created_at
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions.into_iter().map(|s| s.into()).collect())
    }

    async fn find_by_event_and_status(
        &self,
        event_id: &ID,
        status: SubscriptionStatus,
    ) -> anyhow::Result<Vec<EventAlertSubscription>> {
        let subscriptions = sqlx::query_as::<_, EventAlertSubscriptionRaw>(
            r#"
            SELECT * FROM event_alert_subscriptions AS s
            WHERE s.event_uid = $1 AND s.status = $2
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions.into_iter().map(|s| s.into()).collect())
    }

    async fn respond(
        &self,
        event_id: &ID,
        member_id: &ID,
        response: AlertResponse,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<EventAlertSubscription>> {
        let subscription = sqlx::query_as::<_, EventAlertSubscriptionRaw>(
            r#"
            UPDATE event_alert_subscriptions
            SET status = $3, updated_at = $4
            WHERE event_uid = $1 AND member_uid = $2
            RETURNING *
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(member_id.inner_ref())
        .bind(response.target_status().as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription.map(|s| s.into()))
    }

    async fn mark_reminder_sent(
        &self,
        subscription_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE event_alert_subscriptions
            SET reminder_sent_at = $2, updated_at = $2
            WHERE subscription_uid = $1
            AND status = 'PENDING'
            AND reminder_sent_at IS NULL
            "#,
        )
        .bind(subscription_id.inner_ref())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn expire_pending(&self, subscription_id: &ID, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE event_alert_subscriptions
            SET status = 'UNSUBSCRIBED', updated_at = $2
            WHERE subscription_uid = $1 AND status = 'PENDING'
            "#,
        )
        .bind(subscription_id.inner_ref())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}
