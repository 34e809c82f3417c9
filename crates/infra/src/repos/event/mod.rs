mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use community_alerts_domain::{Event, ID};
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &Event) -> anyhow::Result<()>;
    /// Stores every field of `e` except `last_repeating_alert_sent_at`, which
    /// is kept unless the start minute changed, in which case it is cleared
    async fn save(&self, e: &Event) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<Event>;
    /// Events that are not over as of `after`. A one-off event qualifies
    /// when it starts at or after `after`, a repeating one while its series
    /// has not ended before `after`.
    async fn find_alert_candidates(&self, after: DateTime<Utc>) -> anyhow::Result<Vec<Event>>;
    async fn set_last_repeating_alert_sent_at(
        &self,
        event_id: &ID,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
