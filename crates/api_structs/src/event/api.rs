use crate::dtos::{EventAlertSubscriptionDTO, EventDTO};
use chrono::{DateTime, Utc};
use community_alerts_domain::{
    Event, EventAlertSubscription, EventHost, PlaceType, RepeatPeriod, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event: EventDTO,
    /// Members that were messaged because of this write
    pub alerted_members: usize,
}

impl EventResponse {
    pub fn new(event: Event, alerted_members: usize) -> Self {
        Self {
            event: EventDTO::new(event),
            alerted_members,
        }
    }
}

#[derive(Deserialize, Serialize)]
pub struct EventPathParams {
    pub event_id: ID,
}

pub mod create_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        pub date: DateTime<Utc>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub place_type: Option<PlaceType>,
        #[serde(default)]
        pub place: Option<String>,
        #[serde(default)]
        pub custom_place_type: Option<String>,
        #[serde(default)]
        pub event_type: Option<String>,
        #[serde(default)]
        pub open: Option<bool>,
        #[serde(default)]
        pub hosts: Option<Vec<EventHost>>,
        #[serde(default)]
        pub repeat_period: Option<RepeatPeriod>,
        #[serde(default)]
        pub repeat_interval: Option<i64>,
        #[serde(default)]
        pub repeat_end_date: Option<DateTime<Utc>>,
    }

    pub type APIResponse = EventResponse;
}

pub mod event_created {
    use super::*;

    pub type PathParams = EventPathParams;

    pub type APIResponse = EventResponse;
}

pub mod update_event {
    use super::*;

    pub type PathParams = EventPathParams;

    #[derive(Debug, Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub date: Option<DateTime<Utc>>,
        #[serde(default)]
        pub place_type: Option<PlaceType>,
        #[serde(default)]
        pub place: Option<String>,
        #[serde(default)]
        pub custom_place_type: Option<String>,
        #[serde(default)]
        pub event_type: Option<String>,
        #[serde(default)]
        pub open: Option<bool>,
        #[serde(default)]
        pub hosts: Option<Vec<EventHost>>,
        /// `false` turns a repeating event into a one-off event, `true`
        /// needs a period, either in this body or already stored
        #[serde(default)]
        pub is_repeating: Option<bool>,
        #[serde(default)]
        pub repeat_period: Option<RepeatPeriod>,
        #[serde(default)]
        pub repeat_interval: Option<i64>,
        /// Left out keeps the stored end, `null` removes it
        #[serde(
            default,
            deserialize_with = "present_field",
            skip_serializing_if = "Option::is_none"
        )]
        pub repeat_end_date: Option<Option<DateTime<Utc>>>,
    }

    /// Tells a field sent as `null` apart from a missing one
    fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub type APIResponse = EventResponse;
}

pub mod get_event_subscriptions {
    use super::*;

    pub type PathParams = EventPathParams;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscriptions: Vec<EventAlertSubscriptionDTO>,
    }

    impl APIResponse {
        pub fn new(subscriptions: Vec<EventAlertSubscription>) -> Self {
            Self {
                subscriptions: subscriptions
                    .into_iter()
                    .map(EventAlertSubscriptionDTO::new)
                    .collect(),
            }
        }
    }
}
