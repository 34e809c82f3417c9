use chrono::{DateTime, Utc};
use community_alerts_domain::{
    Event, EventAlertSubscription, EventHost, PlaceType, RepeatPeriod, SubscriptionStatus, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventDTO {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub place_type: PlaceType,
    pub place: String,
    pub custom_place_type: String,
    pub event_type: String,
    pub open: bool,
    pub hosts: Vec<EventHost>,
    pub is_repeating: bool,
    pub repeat_period: Option<RepeatPeriod>,
    pub repeat_interval: i64,
    pub repeat_end_date: Option<DateTime<Utc>>,
    pub last_repeating_alert_sent_at: Option<DateTime<Utc>>,
}

impl EventDTO {
    pub fn new(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            place_type: event.place_type,
            place: event.place,
            custom_place_type: event.custom_place_type,
            event_type: event.event_type,
            open: event.open,
            hosts: event.hosts,
            is_repeating: event.is_repeating,
            repeat_period: event.repeat_period,
            repeat_interval: event.repeat_interval,
            repeat_end_date: event.repeat_end_date,
            last_repeating_alert_sent_at: event.last_repeating_alert_sent_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventAlertSubscriptionDTO {
    pub id: ID,
    pub event_id: ID,
    pub member_id: ID,
    pub status: SubscriptionStatus,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventAlertSubscriptionDTO {
    pub fn new(subscription: EventAlertSubscription) -> Self {
        Self {
            id: subscription.id,
            event_id: subscription.event_id,
            member_id: subscription.member_id,
            status: subscription.status,
            reminder_sent_at: subscription.reminder_sent_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}
