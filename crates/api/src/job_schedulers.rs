use crate::{
    alert::AlertScheduler, birthday::SendBirthdayGreetingsUseCase, shared::usecase::execute,
};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use community_alerts_infra::AlertsContext;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Next instant after `now` at which the local clock in `tz` shows `hour`:00
pub fn next_local_run(now: DateTime<Utc>, tz: &Tz, hour: u32) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    for days in 0..3 {
        let date = today + chrono::Duration::days(days);
        let at = date
            .and_hms_opt(hour, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            .map(|at| at.with_timezone(&Utc));
        match at {
            Some(at) if at > now => return at,
            _ => continue,
        }
    }
    now + chrono::Duration::days(1)
}

/// Runs a scheduler pass at the start of every minute. A pass is awaited
/// before the next tick is taken so passes never overlap.
pub fn start_alert_scheduler_job(scheduler: AlertScheduler, ctx: AlertsContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        let mut minutely_interval = interval_at(start, Duration::from_secs(60));
        minutely_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            minutely_interval.tick().await;
            if let Some(res) = scheduler.tick().await {
                debug!(
                    "Scheduler pass checked {} events, sent {} tier alerts",
                    res.events_checked,
                    res.tier_alerts_sent.len()
                );
            }
        }
    });
}

/// Announces birthdays once a day at the configured local hour
pub fn start_birthday_job(ctx: AlertsContext) {
    actix_web::rt::spawn(async move {
        loop {
            let now = ctx.sys.now();
            let next_run = next_local_run(
                now,
                &ctx.config.alert_schedule.timezone,
                ctx.config.birthday_broadcast_hour,
            );
            info!("Next birthday broadcast at {}", next_run);
            let delay = (next_run - now)
                .to_std()
                .unwrap_or_else(|_| Duration::from_secs(60));
            sleep(delay).await;

            // Errors are logged by the usecase executor
            let _ = execute(SendBirthdayGreetingsUseCase {}, &ctx).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_delay_works() {
        assert_eq!(get_start_delay(50 * 1000, 5), 5);
        assert_eq!(get_start_delay(50 * 1000, 10), 60);
        assert_eq!(get_start_delay(50 * 1000, 15), 55);
        assert_eq!(get_start_delay(60 * 1000, 60), 60);
        assert_eq!(get_start_delay(60 * 1000, 10), 50);
        assert_eq!(get_start_delay(59 * 1000, 0), 1);
        assert_eq!(get_start_delay(59 * 1000, 1), 60);
    }

    #[test]
    fn next_local_run_works() {
        let tz = chrono_tz::Europe::Moscow;
        // 05:30 in Moscow
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 2, 30, 0).unwrap();
        assert_eq!(
            next_local_run(now, &tz, 9),
            Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()
        );
        // Exactly 09:00 in Moscow, the next run is tomorrow
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        assert_eq!(
            next_local_run(now, &tz, 9),
            Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap()
        );
        assert_eq!(
            next_local_run(now, &chrono_tz::UTC, 23),
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap()
        );
    }
}
