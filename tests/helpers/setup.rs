use community_alerts_api::Application;
use community_alerts_domain::Member;
use community_alerts_infra::{AlertsContext, InMemoryMessagingChannel};
use std::sync::Arc;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub struct TestApp {
    pub ctx: AlertsContext,
    pub messenger: Arc<InMemoryMessagingChannel>,
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn insert_members(&self, members: &[Member]) {
        for member in members {
            self.ctx
                .repos
                .members
                .insert(member)
                .await
                .expect("Expected to insert member");
        }
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let messenger = Arc::new(InMemoryMessagingChannel::new());
    let mut ctx = AlertsContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.telegram_webhook_secret = WEBHOOK_SECRET.into();
    ctx.messenger = messenger.clone();

    let application = Application::without_jobs(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        messenger,
        address,
        client: reqwest::Client::new(),
    }
}
