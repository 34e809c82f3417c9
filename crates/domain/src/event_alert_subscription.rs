use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    /// Initial alert was sent and the member has not answered yet
    Pending,
    /// Member pressed "attending" and receives every further reminder
    Subscribed,
    /// Member pressed "not attending" or never answered the re-prompt
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Subscribed => "SUBSCRIBED",
            Self::Unsubscribed => "UNSUBSCRIBED",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ();

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status {
            "PENDING" => Ok(Self::Pending),
            "SUBSCRIBED" => Ok(Self::Subscribed),
            "UNSUBSCRIBED" => Ok(Self::Unsubscribed),
            _ => Err(()),
        }
    }
}

/// Answer a member gives through the buttons of an initial alert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertResponse {
    Attend,
    Decline,
}

impl AlertResponse {
    pub fn target_status(&self) -> SubscriptionStatus {
        match self {
            Self::Attend => SubscriptionStatus::Subscribed,
            Self::Decline => SubscriptionStatus::Unsubscribed,
        }
    }

    pub fn callback_prefix(&self) -> &'static str {
        match self {
            Self::Attend => "event_attend",
            Self::Decline => "event_decline",
        }
    }

    /// Data attached to the inline button, e.g. `event_attend:<event id>`
    pub fn callback_data(&self, event_id: &ID) -> String {
        format!("{}:{}", self.callback_prefix(), event_id)
    }

    pub fn parse_callback_data(data: &str) -> Option<(Self, ID)> {
        let (prefix, event_id) = data.split_once(':')?;
        let response = match prefix {
            "event_attend" => Self::Attend,
            "event_decline" => Self::Decline,
            _ => return None,
        };
        let event_id = event_id.trim().parse().ok()?;
        Some((response, event_id))
    }

    pub fn acknowledgement(&self) -> &'static str {
        match self {
            Self::Attend => "Great! You will receive reminders about this event",
            Self::Decline => "You are unsubscribed from reminders about this event",
        }
    }
}

/// Opt-in state of one `Member` for the reminders of one `Event`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAlertSubscription {
    pub id: ID,
    pub event_id: ID,
    pub member_id: ID,
    pub status: SubscriptionStatus,
    /// When the member was re-prompted after not answering the initial alert
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the reminder maintenance should do with a `Pending` subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Still inside the answer window
    Wait,
    /// Never answered the initial alert, prompt once more
    Reprompt,
    /// Never answered the re-prompt either, implicit decline
    Expire,
}

impl EventAlertSubscription {
    pub fn new(event_id: ID, member_id: ID, now: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            event_id,
            member_id,
            status: SubscriptionStatus::Pending,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an explicit member answer. Allowed from every state.
    pub fn respond(&mut self, response: AlertResponse, now: DateTime<Utc>) {
        self.status = response.target_status();
        self.updated_at = now;
    }

    pub fn pending_action(&self, now: DateTime<Utc>, reminder_interval: Duration) -> PendingAction {
        if self.status != SubscriptionStatus::Pending {
            return PendingAction::Wait;
        }
        match self.reminder_sent_at {
            Some(reminded) if reminded + reminder_interval < now => PendingAction::Expire,
            Some(_) => PendingAction::Wait,
            None if now - self.created_at >= reminder_interval => PendingAction::Reprompt,
            None => PendingAction::Wait,
        }
    }

    /// Timeout transition, only a `Pending` subscription can expire
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SubscriptionStatus::Pending {
            return false;
        }
        self.status = SubscriptionStatus::Unsubscribed;
        self.updated_at = now;
        true
    }
}

impl Entity for EventAlertSubscription {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn interval() -> Duration {
        Duration::minutes(1440)
    }

    #[test]
    fn parses_callback_data() {
        let event_id = ID::new();
        let data = AlertResponse::Attend.callback_data(&event_id);
        assert_eq!(
            AlertResponse::parse_callback_data(&data),
            Some((AlertResponse::Attend, event_id.clone()))
        );
        let data = AlertResponse::Decline.callback_data(&event_id);
        assert_eq!(
            AlertResponse::parse_callback_data(&data),
            Some((AlertResponse::Decline, event_id))
        );
        assert!(AlertResponse::parse_callback_data("event_attend").is_none());
        assert!(AlertResponse::parse_callback_data("event_attend:12").is_none());
        assert!(AlertResponse::parse_callback_data("other:1").is_none());
    }

    #[test]
    fn explicit_answers_work_from_every_state() {
        let mut sub = EventAlertSubscription::new(ID::new(), ID::new(), now());
        sub.respond(AlertResponse::Decline, now());
        assert_eq!(sub.status, SubscriptionStatus::Unsubscribed);
        sub.respond(AlertResponse::Attend, now());
        assert_eq!(sub.status, SubscriptionStatus::Subscribed);
        sub.respond(AlertResponse::Decline, now());
        assert_eq!(sub.status, SubscriptionStatus::Unsubscribed);
    }

    #[test]
    fn pending_lifecycle() {
        let created = now();
        let mut sub = EventAlertSubscription::new(ID::new(), ID::new(), created);

        assert_eq!(sub.pending_action(created + Duration::hours(1), interval()), PendingAction::Wait);
        assert_eq!(sub.pending_action(created + interval(), interval()), PendingAction::Reprompt);

        let reminded = created + interval();
        sub.reminder_sent_at = Some(reminded);
        assert_eq!(sub.pending_action(reminded + interval(), interval()), PendingAction::Wait);
        assert_eq!(
            sub.pending_action(reminded + interval() + Duration::seconds(1), interval()),
            PendingAction::Expire
        );
    }

    #[test]
    fn timeout_only_affects_pending() {
        let mut sub = EventAlertSubscription::new(ID::new(), ID::new(), now());
        sub.reminder_sent_at = Some(now() - Duration::days(3));
        sub.respond(AlertResponse::Attend, now());

        assert_eq!(sub.pending_action(now(), interval()), PendingAction::Wait);
        assert!(!sub.expire(now()));
        assert_eq!(sub.status, SubscriptionStatus::Subscribed);
    }
}
