use chrono::Duration;
use chrono_tz::Tz;
use community_alerts_domain::{AlertSchedule, ScheduledTime};
use community_alerts_utils::create_random_secret;
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Bot API token. Without it messages are logged and dropped.
    pub telegram_bot_token: Option<String>,
    /// Community chat the birthday broadcast goes to, 0 disables it
    pub telegram_main_chat_id: i64,
    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` webhook header
    pub telegram_webhook_secret: String,
    /// How long a member has to answer an initial alert before being
    /// prompted again, and then to answer the prompt before being unsubscribed
    pub reminder_interval: Duration,
    pub alert_schedule: AlertSchedule,
    /// Local hour of the day at which birthdays are announced
    pub birthday_broadcast_hour: u32,
    /// Upper bound for a single outbound message
    pub message_send_timeout: std::time::Duration,
    /// Maximum number of messages sent concurrently for one event
    pub alert_dispatch_concurrency: usize,
}

/// Parses `value` or falls back to `default` with a warning
fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
{
    match value {
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        None => default,
    }
}

fn env_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    parse_or_default(key, std::env::var(key).ok(), default)
}

fn minutes_or_default(key: &str, default: i64) -> Duration {
    let minutes = env_or_default::<i64>(key, default);
    if minutes <= 0 {
        warn!(
            "The given {}: {} must be positive, falling back to the default: {}.",
            key, minutes, default
        );
        return Duration::minutes(default);
    }
    Duration::minutes(minutes)
}

fn alert_schedule_from_env() -> AlertSchedule {
    let first = minutes_or_default("ALERT_FIRST_INTERVAL_MINUTES", 10080);
    let second = minutes_or_default("ALERT_SECOND_INTERVAL_MINUTES", 1440);
    let third = minutes_or_default("ALERT_THIRD_INTERVAL_MINUTES", 60);
    if !(first > second && second > third) {
        warn!(
            "Alert thresholds are expected to descend, got first: {}m, second: {}m, third: {}m.",
            first.num_minutes(),
            second.num_minutes(),
            third.num_minutes()
        );
    }

    AlertSchedule {
        first,
        second,
        third,
        scheduled_time: env_or_default("ALERT_SCHEDULED_TIME", ScheduledTime::default()),
        timezone: env_or_default::<Tz>("ALERT_TIMEZONE", chrono_tz::Europe::Moscow),
    }
}

impl Config {
    pub fn new() -> Self {
        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        if telegram_bot_token.is_none() {
            warn!("Did not find TELEGRAM_BOT_TOKEN environment variable. Outgoing messages will only be logged.");
        }

        let telegram_webhook_secret = match std::env::var("TELEGRAM_WEBHOOK_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find TELEGRAM_WEBHOOK_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!("Secret for the telegram webhook was generated and set to: {}", secret);
                secret
            }
        };

        let mut birthday_broadcast_hour = env_or_default::<u32>("BIRTHDAY_BROADCAST_HOUR", 9);
        if birthday_broadcast_hour > 23 {
            warn!(
                "The given BIRTHDAY_BROADCAST_HOUR: {} is not an hour of the day, falling back to the default: 9.",
                birthday_broadcast_hour
            );
            birthday_broadcast_hour = 9;
        }

        let message_send_timeout_secs = env_or_default::<u64>("MESSAGE_SEND_TIMEOUT_SECS", 10).max(1);
        let alert_dispatch_concurrency = env_or_default::<usize>("ALERT_DISPATCH_CONCURRENCY", 8).max(1);

        Self {
            port: env_or_default("PORT", 5000),
            telegram_bot_token,
            telegram_main_chat_id: env_or_default("TELEGRAM_MAIN_CHAT_ID", 0),
            telegram_webhook_secret,
            reminder_interval: minutes_or_default("REMINDER_INTERVAL_MINUTES", 1440),
            alert_schedule: alert_schedule_from_env(),
            birthday_broadcast_hour,
            message_send_timeout: std::time::Duration::from_secs(message_send_timeout_secs),
            alert_dispatch_concurrency,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
