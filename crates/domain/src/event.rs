use crate::shared::{
    entity::{Entity, ID},
    recurrence::{RecurrenceRule, RepeatPeriod},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaceType {
    Online,
    Offline,
    Hybrid,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
            Self::Hybrid => "HYBRID",
        }
    }
}

impl FromStr for PlaceType {
    type Err = ();

    fn from_str(place_type: &str) -> Result<Self, Self::Err> {
        match place_type {
            "ONLINE" => Ok(Self::Online),
            "OFFLINE" => Ok(Self::Offline),
            "HYBRID" => Ok(Self::Hybrid),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventHost {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl EventHost {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// A community calendar entry. Either happens once at `date` or repeats
/// from `date` every `repeat_interval` `repeat_period`s.
#[derive(Debug, Clone)]
pub struct Event {
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
    /// Last time any tiered reminder was sent for this event
    pub last_repeating_alert_sent_at: Option<DateTime<Utc>>,
}

impl Entity for Event {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Event {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            title: title.into(),
            description: String::new(),
            date,
            place_type: PlaceType::Online,
            place: String::new(),
            custom_place_type: String::new(),
            event_type: String::new(),
            open: true,
            hosts: Vec::new(),
            is_repeating: false,
            repeat_period: None,
            repeat_interval: 1,
            repeat_end_date: None,
            last_repeating_alert_sent_at: None,
        }
    }

    /// The recurrence of this event. A repeating event without a period is
    /// treated as a one-off event.
    pub fn recurrence(&self) -> Option<RecurrenceRule> {
        if !self.is_repeating {
            return None;
        }
        self.repeat_period
            .map(|period| RecurrenceRule::new(period, self.repeat_interval, self.repeat_end_date))
    }

    /// The occurrence reminders are evaluated against at `now`
    pub fn effective_occurrence(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.recurrence() {
            Some(rule) => rule.next_occurrence(self.date, now),
            None => Some(self.date),
        }
    }

    /// Whether the event, or its whole series, lies before `at`
    pub fn is_over(&self, at: DateTime<Utc>) -> bool {
        if self.date >= at {
            return false;
        }
        match self.recurrence() {
            Some(rule) => matches!(rule.end, Some(end) if end < at),
            None => true,
        }
    }

    /// Whether `date` falls in the same minute as the start of this event
    pub fn starts_in_same_minute(&self, date: DateTime<Utc>) -> bool {
        self.date.timestamp().div_euclid(60) == date.timestamp().div_euclid(60)
    }

    /// Moves the event. A changed start (minute precision) makes the event a
    /// new occurrence for alerting, so the dedup stamp is cleared.
    pub fn set_date(&mut self, date: DateTime<Utc>) -> bool {
        let changed = !self.starts_in_same_minute(date);
        self.date = date;
        if changed {
            self.last_repeating_alert_sent_at = None;
        }
        changed
    }

    pub fn set_recurrence(
        &mut self,
        period: Option<RepeatPeriod>,
        interval: Option<i64>,
        end: Option<DateTime<Utc>>,
    ) {
        self.is_repeating = period.is_some();
        self.repeat_period = period;
        self.repeat_interval = interval.unwrap_or(1).max(1);
        self.repeat_end_date = end;
    }
}
