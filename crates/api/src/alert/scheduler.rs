use super::{
    check_event_alerts::{self, CheckEventAlertsUseCase},
    send_initial_alerts::SendInitialAlertsUseCase,
    send_update_alerts::SendUpdateAlertsUseCase,
};
use crate::shared::usecase::execute;
use community_alerts_domain::{AlertTrigger, Event, EventAlertState};
use community_alerts_infra::AlertsContext;
use tracing::{info, warn};

/// Called by whatever writes events
#[async_trait::async_trait(?Send)]
pub trait EventAlertHooks {
    /// Returns the number of members that were asked whether they attend
    async fn on_event_created(&self, event: &Event) -> usize;
    /// Returns the number of members that were told about the change
    async fn on_event_updated(&self, event: &Event) -> usize;
}

/// Drives every alert of every event
#[derive(Clone)]
pub struct AlertScheduler {
    ctx: AlertsContext,
}

impl AlertScheduler {
    pub fn new(ctx: AlertsContext) -> Self {
        Self { ctx }
    }

    /// One scheduler pass. Errors are logged, never propagated.
    pub async fn tick(&self) -> Option<check_event_alerts::UseCaseResponse> {
        execute(CheckEventAlertsUseCase {}, &self.ctx).await.ok()
    }
}

#[async_trait::async_trait(?Send)]
impl EventAlertHooks for AlertScheduler {
    async fn on_event_created(&self, event: &Event) -> usize {
        let state = EventAlertState::evaluate(
            event,
            &self.ctx.config.alert_schedule,
            AlertTrigger::Created,
            self.ctx.sys.now(),
        );
        if state != EventAlertState::NeedsInitialAlert {
            return 0;
        }

        let usecase = SendInitialAlertsUseCase {
            event: event.clone(),
        };
        match execute(usecase, &self.ctx).await {
            Ok(res) => {
                info!(
                    "Initial alerts for event: {} sent, {} new subscriptions, delivery: {:?}",
                    event.id, res.subscriptions_created, res.report
                );
                res.subscriptions_created
            }
            Err(e) => {
                warn!("Initial alerts for event: {} failed: {:?}", event.id, e);
                0
            }
        }
    }

    async fn on_event_updated(&self, event: &Event) -> usize {
        let usecase = SendUpdateAlertsUseCase {
            event: event.clone(),
        };
        match execute(usecase, &self.ctx).await {
            Ok(report) => report.delivered,
            Err(e) => {
                warn!("Update alerts for event: {} failed: {:?}", event.id, e);
                0
            }
        }
    }
}
