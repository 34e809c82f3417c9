mod alert;
mod alert_message;
mod event;
mod event_alert_subscription;
mod member;
mod shared;

pub use alert::{
    AlertSchedule, AlertTier, AlertTrigger, EventAlertState, InvalidScheduledTimeError,
    ScheduledTime,
};
pub use alert_message::{AlertKind, AlertMessage, CallbackButton};
pub use event::{Event, EventHost, PlaceType};
pub use event_alert_subscription::{
    AlertResponse, EventAlertSubscription, PendingAction, SubscriptionStatus,
};
pub use member::{Member, MemberRole};
pub use shared::entity::{Entity, ID};
pub use shared::recurrence::{InvalidRepeatPeriodError, RecurrenceRule, RepeatPeriod};
