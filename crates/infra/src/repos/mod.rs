mod event;
mod event_alert_subscription;
mod member;
mod shared;

pub use event::IEventRepo;
use event::{InMemoryEventRepo, PostgresEventRepo};
pub use event_alert_subscription::{IEventAlertSubscriptionRepo, SubscriptionStoreError};
use event_alert_subscription::{
    InMemoryEventAlertSubscriptionRepo, PostgresEventAlertSubscriptionRepo,
};
pub use member::IMemberRepo;
use member::{InMemoryMemberRepo, PostgresMemberRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub members: Arc<dyn IMemberRepo>,
    pub event_alert_subscriptions: Arc<dyn IEventAlertSubscriptionRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            members: Arc::new(PostgresMemberRepo::new(pool.clone())),
            event_alert_subscriptions: Arc::new(PostgresEventAlertSubscriptionRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            members: Arc::new(InMemoryMemberRepo::new()),
            event_alert_subscriptions: Arc::new(InMemoryEventAlertSubscriptionRepo::new()),
        }
    }
}
