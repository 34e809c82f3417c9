use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepeatPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Singular english noun for the period, e.g. "week"
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::Yearly => "year",
        }
    }
}

impl Display for RepeatPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRepeatPeriodError {
    #[error("Unknown repeat period: {0}")]
    Unknown(String),
}

impl FromStr for RepeatPeriod {
    type Err = InvalidRepeatPeriodError;

    fn from_str(period: &str) -> Result<Self, Self::Err> {
        match period.trim().to_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(InvalidRepeatPeriodError::Unknown(period.to_string())),
        }
    }
}

/// How a repeating event recurs: every `interval` `period`s, optionally
/// until `end`.
///
/// Monthly and yearly steps are true calendar steps. When the anchor day
/// does not exist in the target month the occurrence is clamped to the last
/// day of that month. Every occurrence is computed from the anchor and not
/// from the previous occurrence, so clamping never accumulates:
/// Jan 31 -> Feb 29 (leap year) -> Mar 31 -> Apr 30.
#[derive(Clone, Debug, PartialEq)]
pub struct RecurrenceRule {
    pub period: RepeatPeriod,
    pub interval: u32,
    pub end: Option<DateTime<Utc>>,
}

impl RecurrenceRule {
    /// An interval below 1 is read as 1
    pub fn new(period: RepeatPeriod, interval: i64, end: Option<DateTime<Utc>>) -> Self {
        let interval = interval.clamp(1, u32::MAX as i64) as u32;
        Self {
            period,
            interval,
            end,
        }
    }

    /// The `k`-th occurrence of the series anchored at `start`. `k = 0` is the anchor.
    pub fn occurrence(&self, start: DateTime<Utc>, k: u32) -> Option<DateTime<Utc>> {
        let steps = k.checked_mul(self.interval)?;
        match self.period {
            RepeatPeriod::Daily => start.checked_add_signed(Duration::days(steps as i64)),
            RepeatPeriod::Weekly => start.checked_add_signed(Duration::weeks(steps as i64)),
            RepeatPeriod::Monthly => start.checked_add_months(Months::new(steps)),
            RepeatPeriod::Yearly => start.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }

    /// Lower bound for the number of steps whose occurrence is not after `after`.
    /// Lets the search start close to `after` for long running series.
    fn steps_not_after(&self, start: DateTime<Utc>, after: DateTime<Utc>) -> u32 {
        if after <= start {
            return 0;
        }
        let periods = match self.period {
            RepeatPeriod::Daily => (after - start).num_days(),
            RepeatPeriod::Weekly => (after - start).num_weeks(),
            RepeatPeriod::Monthly => months_between(&start, &after) - 1,
            RepeatPeriod::Yearly => (months_between(&start, &after) - 1) / 12,
        };
        (periods.max(0) / self.interval as i64).min(u32::MAX as i64) as u32
    }

    /// First occurrence strictly after `after`, or `None` when the series
    /// has ended by then.
    pub fn next_occurrence(
        &self,
        start: DateTime<Utc>,
        after: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if let Some(end) = self.end {
            if after >= end {
                return None;
            }
        }

        let mut k = self.steps_not_after(start, after);
        let mut candidate = self.occurrence(start, k)?;
        while candidate <= after {
            k = k.checked_add(1)?;
            candidate = self.occurrence(start, k)?;
        }

        match self.end {
            Some(end) if candidate > end => None,
            _ => Some(candidate),
        }
    }
}

fn months_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + to.month() as i64 - from.month() as i64
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_repeat_period() {
        assert_eq!("WEEKLY".parse::<RepeatPeriod>(), Ok(RepeatPeriod::Weekly));
        assert_eq!("monthly".parse::<RepeatPeriod>(), Ok(RepeatPeriod::Monthly));
        assert_eq!(" yearly ".parse::<RepeatPeriod>(), Ok(RepeatPeriod::Yearly));
        assert!("FORTNIGHTLY".parse::<RepeatPeriod>().is_err());
        assert!("".parse::<RepeatPeriod>().is_err());
    }

    #[test]
    fn weekly_series_with_end_date() {
        let start = dt(2024, 1, 1, 10, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Weekly, 1, Some(dt(2024, 2, 1, 0, 0)));

        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 10, 0, 0)),
            Some(dt(2024, 1, 15, 10, 0))
        );
        assert_eq!(rule.next_occurrence(start, dt(2024, 2, 2, 0, 0)), None);
        // Last occurrence inside the series is Jan 29, the next one is past the end
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 29, 9, 0)),
            Some(dt(2024, 1, 29, 10, 0))
        );
        assert_eq!(rule.next_occurrence(start, dt(2024, 1, 29, 10, 0)), None);
    }

    #[test]
    fn end_date_is_exclusive_for_the_reference_instant() {
        let start = dt(2024, 1, 1, 10, 0);
        let end = dt(2024, 1, 8, 10, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, 1, Some(end));
        assert_eq!(rule.next_occurrence(start, end), None);
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 7, 10, 0)),
            Some(end)
        );
    }

    #[test]
    fn anchor_in_the_future_is_the_next_occurrence() {
        let start = dt(2024, 5, 1, 18, 30);
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, 3, None);
        assert_eq!(rule.next_occurrence(start, dt(2024, 4, 1, 0, 0)), Some(start));
    }

    #[test]
    fn occurrence_equal_to_reference_is_skipped() {
        let start = dt(2024, 1, 1, 10, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, 2, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 3, 10, 0)),
            Some(dt(2024, 1, 5, 10, 0))
        );
        assert_eq!(
            rule.next_occurrence(start, start),
            Some(dt(2024, 1, 3, 10, 0))
        );
    }

    #[test]
    fn every_second_week() {
        let start = dt(2024, 1, 1, 10, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Weekly, 2, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 2, 0, 0)),
            Some(dt(2024, 1, 15, 10, 0))
        );
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 16, 0, 0)),
            Some(dt(2024, 1, 29, 10, 0))
        );
    }

    #[test]
    fn monthly_clamps_to_month_end_from_the_anchor() {
        let start = dt(2024, 1, 31, 19, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Monthly, 1, None);

        let feb = rule.next_occurrence(start, start).unwrap();
        assert_eq!(feb, dt(2024, 2, 29, 19, 0));
        let mar = rule.next_occurrence(start, feb).unwrap();
        assert_eq!(mar, dt(2024, 3, 31, 19, 0));
        let apr = rule.next_occurrence(start, mar).unwrap();
        assert_eq!(apr, dt(2024, 4, 30, 19, 0));
        let may = rule.next_occurrence(start, apr).unwrap();
        assert_eq!(may, dt(2024, 5, 31, 19, 0));
    }

    #[test]
    fn monthly_in_non_leap_year() {
        let start = dt(2023, 1, 30, 8, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Monthly, 1, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2023, 2, 1, 0, 0)),
            Some(dt(2023, 2, 28, 8, 0))
        );
    }

    #[test]
    fn every_three_months() {
        let start = dt(2023, 11, 15, 12, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Monthly, 3, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 1, 1, 0, 0)),
            Some(dt(2024, 2, 15, 12, 0))
        );
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 2, 15, 12, 0)),
            Some(dt(2024, 5, 15, 12, 0))
        );
    }

    #[test]
    fn yearly_from_leap_day() {
        let start = dt(2024, 2, 29, 9, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Yearly, 1, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2024, 3, 1, 0, 0)),
            Some(dt(2025, 2, 28, 9, 0))
        );
        assert_eq!(
            rule.next_occurrence(start, dt(2027, 3, 1, 0, 0)),
            Some(dt(2028, 2, 29, 9, 0))
        );
    }

    #[test]
    fn non_positive_interval_is_read_as_one() {
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, 0, None);
        assert_eq!(rule.interval, 1);
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, -4, None);
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn old_anchor_is_cheap_and_exact() {
        let start = dt(2000, 1, 1, 10, 0);
        let rule = RecurrenceRule::new(RepeatPeriod::Daily, 1, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2030, 6, 15, 10, 30)),
            Some(dt(2030, 6, 16, 10, 0))
        );
        let rule = RecurrenceRule::new(RepeatPeriod::Monthly, 1, None);
        assert_eq!(
            rule.next_occurrence(start, dt(2030, 6, 15, 10, 30)),
            Some(dt(2030, 7, 1, 10, 0))
        );
    }

    #[test]
    fn next_occurrence_is_strictly_after_reference() {
        let start = dt(2024, 1, 31, 23, 59);
        let periods = [
            RepeatPeriod::Daily,
            RepeatPeriod::Weekly,
            RepeatPeriod::Monthly,
            RepeatPeriod::Yearly,
        ];
        for period in periods {
            for interval in 1..4 {
                let rule = RecurrenceRule::new(period, interval, None);
                let mut after = dt(2023, 12, 1, 0, 0);
                for _ in 0..40 {
                    let next = rule.next_occurrence(start, after).unwrap();
                    assert!(next > after);
                    after = after + Duration::hours(37);
                }
            }
        }
    }
}
