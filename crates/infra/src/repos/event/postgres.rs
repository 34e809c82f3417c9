use super::IEventRepo;
use chrono::{DateTime, Utc};
use community_alerts_domain::{Event, EventHost, PlaceType, RepeatPeriod, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::{error, warn};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_uid: Uuid,
    title: String,
    description: String,
    date: DateTime<Utc>,
    place_type: String,
    place: String,
    custom_place_type: String,
    event_type: String,
    open: bool,
    hosts: Json<Vec<EventHost>>,
    is_repeating: bool,
    repeat_period: Option<String>,
    repeat_interval: Option<i64>,
    repeat_end_date: Option<DateTime<Utc>>,
    last_repeating_alert_sent_at: Option<DateTime<Utc>>,
}

impl From<EventRaw> for Event {
    fn from(raw: EventRaw) -> Self {
        let place_type = raw.place_type.parse().unwrap_or_else(|_| {
            warn!(
                "Event: {} has unknown place type: {}, reading it as online",
                raw.event_uid, raw.place_type
            );
            PlaceType::Online
        });
        let repeat_period = match raw.repeat_period {
            Some(period) => match period.parse::<RepeatPeriod>() {
                Ok(period) => Some(period),
                Err(e) => {
                    warn!(
                        "Event: {} has {}, reading it as not repeating",
                        raw.event_uid, e
                    );
                    None
                }
            },
            None => None,
        };

        Event {
            id: raw.event_uid.into(),
            title: raw.title,
            description: raw.description,
            date: raw.date,
            place_type,
            place: raw.place,
            custom_place_type: raw.custom_place_type,
            event_type: raw.event_type,
            open: raw.open,
            hosts: raw.hosts.0,
            is_repeating: raw.is_repeating && repeat_period.is_some(),
            repeat_period,
            repeat_interval: raw.repeat_interval.unwrap_or(1).max(1),
            repeat_end_date: raw.repeat_end_date,
            last_repeating_alert_sent_at: raw.last_repeating_alert_sent_at,
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, e: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events(
                event_uid,
                title,
                description,
                date,
                place_type,
                place,
                custom_place_type,
                event_type,
                open,
                hosts,
                is_repeating,
                repeat_period,
                repeat_interval,
                repeat_end_date,
                last_repeating_alert_sent_at
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(&e.title)
        .bind(&e.description)
        .bind(e.date)
        .bind(e.place_type.as_str())
        .bind(&e.place)
        .bind(&e.custom_place_type)
        .bind(&e.event_type)
        .bind(e.open)
        .bind(Json(&e.hosts))
        .bind(e.is_repeating)
        .bind(e.repeat_period.map(|p| p.as_str()))
        .bind(e.repeat_interval)
        .bind(e.repeat_end_date)
        .bind(e.last_repeating_alert_sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, e: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE events SET
                title = $2,
                description = $3,
                date = $4,
                place_type = $5,
                place = $6,
                custom_place_type = $7,
                event_type = $8,
                open = $9,
                hosts = $10,
                is_repeating = $11,
                repeat_period = $12,
                repeat_interval = $13,
                repeat_end_date = $14,
                last_repeating_alert_sent_at = CASE
                    WHEN date_trunc('minute', date) IS DISTINCT FROM date_trunc('minute', $4::timestamptz)
                    THEN NULL
                    ELSE last_repeating_alert_sent_at
                END
            WHERE event_uid = $1
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(&e.title)
        .bind(&e.description)
        .bind(e.date)
        .bind(e.place_type.as_str())
        .bind(&e.place)
        .bind(&e.custom_place_type)
        .bind(&e.event_type)
        .bind(e.open)
        .bind(Json(&e.hosts))
        .bind(e.is_repeating)
        .bind(e.repeat_period.map(|p| p.as_str()))
        .bind(e.repeat_interval)
        .bind(e.repeat_end_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        match sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM events AS e
            WHERE e.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(event) => event.map(|e| e.into()),
            Err(e) => {
                error!("Unable to find event: {}. Error: {:?}", event_id, e);
                None
            }
        }
    }

    async fn find_alert_candidates(&self, after: DateTime<Utc>) -> anyhow::Result<Vec<Event>> {
        let events = sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM events AS e
            WHERE e.date >= $1
            OR (
                e.is_repeating
                AND (e.repeat_end_date IS NULL OR e.repeat_end_date >= $1)
            )
            "#,
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await?;

        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    async fn set_last_repeating_alert_sent_at(
        &self,
        event_id: &ID,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE events SET last_repeating_alert_sent_at = $2
            WHERE event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
