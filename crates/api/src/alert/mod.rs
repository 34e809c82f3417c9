mod check_event_alerts;
mod dispatcher;
pub mod handle_alert_response;
mod scheduler;
mod send_initial_alerts;
mod send_update_alerts;

pub use dispatcher::{send_alert, with_send_timeout};
pub use scheduler::{AlertScheduler, EventAlertHooks};
