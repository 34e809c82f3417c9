use crate::event::Event;
use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Reminder thresholds, checked in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTier {
    /// The occurrence is starting right now
    Start,
    /// Closest threshold, sent as soon as it is reached
    Third,
    /// Sent once a day at the scheduled time
    Second,
    /// Farthest threshold, sent once a day at the scheduled time
    First,
}

impl AlertTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Third => "third",
            Self::Second => "second",
            Self::First => "first",
        }
    }
}

impl Display for AlertTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wall clock time of day (`HH:MM`) at which the first and second tier are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTime {
    hour: u32,
    minute: u32,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidScheduledTimeError {
    #[error("Scheduled time must be formatted as HH:MM, got: {0}")]
    Malformed(String),
}

impl ScheduledTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn matches<T: Timelike>(&self, local: &T) -> bool {
        local.hour() == self.hour && local.minute() == self.minute
    }
}

impl Default for ScheduledTime {
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
        }
    }
}

impl FromStr for ScheduledTime {
    type Err = InvalidScheduledTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let e = || InvalidScheduledTimeError::Malformed(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(e)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(e());
        }
        let hour = hour.parse::<u32>().map_err(|_| e())?;
        let minute = minute.parse::<u32>().map_err(|_| e())?;
        Self::new(hour, minute).ok_or_else(e)
    }
}

impl Display for ScheduledTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Upper edge of the start window, measured as time left until the occurrence
fn start_window_end() -> Duration {
    Duration::minutes(1)
}

/// Lower edge of the start window, an occurrence that began less than this long ago
fn start_window_begin() -> Duration {
    Duration::minutes(-2)
}

/// A start alert sent less than this long ago is not sent again
fn start_dedup_window() -> Duration {
    Duration::minutes(2)
}

/// When reminders are due relative to an occurrence
#[derive(Debug, Clone)]
pub struct AlertSchedule {
    pub first: Duration,
    pub second: Duration,
    pub third: Duration,
    pub scheduled_time: ScheduledTime,
    /// Timezone of the scheduled time and of the calendar day used for dedup
    pub timezone: Tz,
}

impl AlertSchedule {
    /// Picks at most one tier for an occurrence `time_until` away. The first
    /// and second tier only fire when the local wall clock shows the
    /// scheduled time.
    pub fn select_tier(&self, time_until: Duration, now: DateTime<Utc>) -> Option<AlertTier> {
        let at_scheduled_time = || {
            self.scheduled_time
                .matches(&now.with_timezone(&self.timezone))
        };

        if time_until > start_window_begin() && time_until <= start_window_end() {
            Some(AlertTier::Start)
        } else if time_until > start_window_end() && time_until <= self.third {
            Some(AlertTier::Third)
        } else if time_until > self.third && time_until <= self.second {
            at_scheduled_time().then(|| AlertTier::Second)
        } else if time_until > self.second && time_until <= self.first {
            at_scheduled_time().then(|| AlertTier::First)
        } else {
            None
        }
    }

    /// Whether `tier` was already covered by the reminder sent at `last_sent`
    pub fn is_duplicate(
        &self,
        tier: AlertTier,
        last_sent: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let last_sent = match last_sent {
            Some(last_sent) => last_sent,
            None => return false,
        };
        match tier {
            AlertTier::Start => now - last_sent < start_dedup_window(),
            _ => {
                last_sent.with_timezone(&self.timezone).date_naive()
                    == now.with_timezone(&self.timezone).date_naive()
            }
        }
    }
}

/// What caused an `Event` to be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTrigger {
    /// The event was just created
    Created,
    /// Periodic pass of the alert scheduler
    Tick,
}

/// Alerting state of one `Event` at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAlertState {
    /// New event, every community member should get the initial alert
    NeedsInitialAlert,
    /// Nothing to send, either no tier matches or the series has ended
    AwaitingTier,
    /// A tier matches and was not sent inside its dedup window yet
    TierDue {
        tier: AlertTier,
        occurrence: DateTime<Utc>,
    },
    /// A tier matches but was already sent inside its dedup window
    TierSent { tier: AlertTier },
}

impl EventAlertState {
    pub fn evaluate(
        event: &Event,
        schedule: &AlertSchedule,
        trigger: AlertTrigger,
        now: DateTime<Utc>,
    ) -> Self {
        if trigger == AlertTrigger::Created {
            return Self::NeedsInitialAlert;
        }

        let occurrence = match event.effective_occurrence(now) {
            Some(occurrence) => occurrence,
            None => return Self::AwaitingTier,
        };
        let tier = match schedule.select_tier(occurrence - now, now) {
            Some(tier) => tier,
            None => return Self::AwaitingTier,
        };

        if schedule.is_duplicate(tier, event.last_repeating_alert_sent_at, now) {
            Self::TierSent { tier }
        } else {
            Self::TierDue { tier, occurrence }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RepeatPeriod;
    use chrono::TimeZone;

    fn schedule() -> AlertSchedule {
        AlertSchedule {
            first: Duration::minutes(10080),
            second: Duration::minutes(1440),
            third: Duration::minutes(60),
            scheduled_time: ScheduledTime::new(12, 0).unwrap(),
            timezone: chrono_tz::UTC,
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_scheduled_time() {
        assert_eq!("09:30".parse(), Ok(ScheduledTime::new(9, 30).unwrap()));
        assert_eq!("9:05".parse(), Ok(ScheduledTime::new(9, 5).unwrap()));
        assert_eq!("23:59".parse(), Ok(ScheduledTime::new(23, 59).unwrap()));
        assert!("24:00".parse::<ScheduledTime>().is_err());
        assert!("12:60".parse::<ScheduledTime>().is_err());
        assert!("12".parse::<ScheduledTime>().is_err());
        assert!("12:5".parse::<ScheduledTime>().is_err());
        assert!("noon".parse::<ScheduledTime>().is_err());
        assert!("".parse::<ScheduledTime>().is_err());
        assert_eq!(ScheduledTime::default().to_string(), "12:00");
    }

    #[test]
    fn start_window() {
        let s = schedule();
        let now = dt(2024, 3, 1, 15, 7);
        assert_eq!(s.select_tier(Duration::minutes(1), now), Some(AlertTier::Start));
        assert_eq!(s.select_tier(Duration::zero(), now), Some(AlertTier::Start));
        assert_eq!(s.select_tier(Duration::seconds(-119), now), Some(AlertTier::Start));
        assert_eq!(s.select_tier(Duration::minutes(-2), now), None);
        assert_eq!(
            s.select_tier(Duration::seconds(61), now),
            Some(AlertTier::Third)
        );
    }

    #[test]
    fn third_tier_has_no_time_of_day_gate() {
        let s = schedule();
        let now = dt(2024, 3, 1, 3, 17);
        assert_eq!(s.select_tier(Duration::minutes(60), now), Some(AlertTier::Third));
        assert_eq!(s.select_tier(Duration::minutes(61), now), None);
    }

    #[test]
    fn first_tier_only_at_scheduled_time() {
        let s = schedule();
        let five_days = Duration::days(5);
        assert_eq!(
            s.select_tier(five_days, dt(2024, 3, 1, 12, 0)),
            Some(AlertTier::First)
        );
        assert_eq!(s.select_tier(five_days, dt(2024, 3, 1, 12, 1)), None);
        assert_eq!(
            s.select_tier(Duration::hours(20), dt(2024, 3, 1, 12, 0)),
            Some(AlertTier::Second)
        );
        assert_eq!(s.select_tier(Duration::days(8), dt(2024, 3, 1, 12, 0)), None);
    }

    #[test]
    fn scheduled_time_is_local() {
        let mut s = schedule();
        s.timezone = chrono_tz::Europe::Moscow;
        // 09:00 UTC is 12:00 in Moscow
        assert_eq!(
            s.select_tier(Duration::days(3), dt(2024, 3, 1, 9, 0)),
            Some(AlertTier::First)
        );
        assert_eq!(s.select_tier(Duration::days(3), dt(2024, 3, 1, 12, 0)), None);
    }

    #[test]
    fn start_dedup() {
        let s = schedule();
        let now = dt(2024, 3, 1, 12, 0);
        assert!(s.is_duplicate(AlertTier::Start, Some(now - Duration::seconds(30)), now));
        assert!(!s.is_duplicate(AlertTier::Start, Some(now - Duration::minutes(2)), now));
        assert!(!s.is_duplicate(AlertTier::Start, None, now));
    }

    #[test]
    fn daily_dedup() {
        let s = schedule();
        let now = dt(2024, 3, 1, 18, 0);
        assert!(s.is_duplicate(AlertTier::Third, Some(dt(2024, 3, 1, 0, 5)), now));
        assert!(s.is_duplicate(AlertTier::First, Some(dt(2024, 3, 1, 12, 0)), now));
        assert!(!s.is_duplicate(AlertTier::Second, Some(dt(2024, 2, 29, 23, 59)), now));
    }

    #[test]
    fn evaluate_picks_one_tier_and_respects_dedup() {
        let s = schedule();
        let now = dt(2024, 3, 1, 12, 0);
        let mut event = Event::new("Talk", now + Duration::minutes(30));

        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Created, now),
            EventAlertState::NeedsInitialAlert
        );
        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Tick, now),
            EventAlertState::TierDue {
                tier: AlertTier::Third,
                occurrence: event.date
            }
        );

        event.last_repeating_alert_sent_at = Some(now - Duration::hours(1));
        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Tick, now),
            EventAlertState::TierSent {
                tier: AlertTier::Third
            }
        );

        // The start alert is still due the same day
        let start = now + Duration::minutes(30);
        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Tick, start),
            EventAlertState::TierDue {
                tier: AlertTier::Start,
                occurrence: event.date
            }
        );
    }

    #[test]
    fn evaluate_uses_next_occurrence_of_repeating_event() {
        let s = schedule();
        let mut event = Event::new("Weekly sync", dt(2024, 1, 1, 10, 0));
        event.set_recurrence(Some(RepeatPeriod::Weekly), Some(1), None);

        // 30 minutes before the occurrence on Jan 15
        let now = dt(2024, 1, 15, 9, 30);
        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Tick, now),
            EventAlertState::TierDue {
                tier: AlertTier::Third,
                occurrence: dt(2024, 1, 15, 10, 0)
            }
        );

        event.repeat_end_date = Some(dt(2024, 1, 10, 0, 0));
        assert_eq!(
            EventAlertState::evaluate(&event, &s, AlertTrigger::Tick, now),
            EventAlertState::AwaitingTier
        );
    }
}
