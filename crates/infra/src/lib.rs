mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    IEventAlertSubscriptionRepo, IEventRepo, IMemberRepo, Repos, SubscriptionStoreError,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AlertsContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub messenger: Arc<dyn IMessagingChannel>,
}

impl AlertsContext {
    /// In-memory repositories and a messaging channel that only records
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            messenger: Arc::new(InMemoryMessagingChannel::new()),
        }
    }
}

fn create_messenger(config: &Config) -> Arc<dyn IMessagingChannel> {
    match &config.telegram_bot_token {
        Some(token) => match TelegramBotApi::new(token.clone(), config.message_send_timeout) {
            Ok(api) => Arc::new(api),
            Err(e) => {
                warn!(
                    "Unable to create the telegram client, outgoing messages will only be logged. Error: {:?}",
                    e
                );
                Arc::new(LogOnlyMessagingChannel {})
            }
        },
        None => Arc::new(LogOnlyMessagingChannel {}),
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<AlertsContext> {
    let config = Config::new();
    let repos = match get_psql_connection_string() {
        Some(connection_string) => {
            info!("DATABASE_URL env var was provided. Going to use postgres.");
            Repos::create_postgres(&connection_string).await?
        }
        None => {
            warn!("DATABASE_URL env var was not provided. Going to use inmemory infra.");
            Repos::create_inmemory()
        }
    };

    Ok(AlertsContext {
        repos,
        messenger: create_messenger(&config),
        config,
        sys: Arc::new(RealSys {}),
    })
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Runs the migrations when postgres is configured
pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string = match get_psql_connection_string() {
        Some(connection_string) => connection_string,
        None => return Ok(()),
    };
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await
}
