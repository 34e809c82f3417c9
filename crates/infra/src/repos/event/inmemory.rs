use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use community_alerts_domain::{Event, ID};

pub struct InMemoryEventRepo {
    events: std::sync::Mutex<Vec<Event>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &Event) -> anyhow::Result<()> {
        insert(e, &self.events);
        Ok(())
    }

    async fn save(&self, e: &Event) -> anyhow::Result<()> {
        update_many(
            &self.events,
            |stored| stored.id == e.id,
            |stored| {
                let sent_at = if stored.starts_in_same_minute(e.date) {
                    stored.last_repeating_alert_sent_at
                } else {
                    None
                };
                *stored = e.clone();
                stored.last_repeating_alert_sent_at = sent_at;
            },
        );
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        find(event_id, &self.events)
    }

    async fn find_alert_candidates(&self, after: DateTime<Utc>) -> anyhow::Result<Vec<Event>> {
        Ok(find_by(&self.events, |e| !e.is_over(after)))
    }

    async fn set_last_repeating_alert_sent_at(
        &self,
        event_id: &ID,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.events,
            |e| e.id == *event_id,
            |e| e.last_repeating_alert_sent_at = Some(sent_at),
        );
        Ok(())
    }
}
