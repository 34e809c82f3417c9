use crate::{
    event::{Event, PlaceType},
    event_alert_subscription::AlertResponse,
};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

/// Phase of an `Event` an alert is sent for, decides the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// First announcement of a new event, carries the answer buttons
    Initial,
    Starting,
    Reminder,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackButton {
    pub text: String,
    pub callback_data: String,
}

/// A rendered alert, `text` is formatted as messaging platform HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub text: String,
    pub buttons: Vec<CallbackButton>,
}

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const DATE_FORMAT: &str = "%d.%m.%Y";

impl AlertMessage {
    pub fn new(
        event: &Event,
        occurrence: DateTime<Utc>,
        kind: AlertKind,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self {
        let mut text = match kind {
            AlertKind::Initial => "⭐ <b>New event!</b>\n\n".to_string(),
            AlertKind::Starting => "🚀 <b>The event is starting!</b>\n\n".to_string(),
            AlertKind::Reminder => format!(
                "📌 <b>Event reminder</b>{}\n\n",
                format_time_remaining(occurrence - now)
            ),
            AlertKind::Update => "✏️ <b>The event has changed</b>\n\n".to_string(),
        };
        write_body(&mut text, event, occurrence, tz);

        let buttons = match kind {
            AlertKind::Initial => vec![
                CallbackButton {
                    text: "✅ Attending".into(),
                    callback_data: AlertResponse::Attend.callback_data(&event.id),
                },
                CallbackButton {
                    text: "❌ Not attending".into(),
                    callback_data: AlertResponse::Decline.callback_data(&event.id),
                },
            ],
            _ => Vec::new(),
        };

        Self { text, buttons }
    }
}

fn write_body(text: &mut String, event: &Event, occurrence: DateTime<Utc>, tz: &Tz) {
    // Writing into a String never fails
    let _ = writeln!(text, "<b>{}</b>", escape_html(&event.title));
    if !event.description.is_empty() {
        let _ = writeln!(text, "\n{}", escape_html(&event.description));
    }

    let _ = writeln!(
        text,
        "\n📆 <b>Date:</b> {} ({})",
        occurrence.with_timezone(tz).format(DATE_TIME_FORMAT),
        tz.name()
    );

    if !event.hosts.is_empty() {
        text.push_str("\n👥 <b>Hosts:</b>\n");
        for host in &event.hosts {
            let name = escape_html(&host.display_name());
            if host.username.is_empty() {
                let _ = writeln!(text, "• {}", name);
            } else {
                let _ = writeln!(text, "• {} (@{})", name, escape_html(&host.username));
            }
        }
    }

    if event.place_type == PlaceType::Online {
        let _ = writeln!(text, "\n🔗 <b>Link:</b> {}", escape_html(&event.place));
    } else {
        let place = if event.custom_place_type.is_empty() {
            event.place.clone()
        } else {
            format!("{}, {}", event.custom_place_type, event.place)
        };
        let _ = writeln!(text, "\n📍 <b>Place:</b> {}", escape_html(&place));
    }

    if let Some(rule) = event.recurrence() {
        text.push_str("\n🔄 <b>Repeats:</b> ");
        if rule.interval == 1 {
            let _ = write!(text, "every {}", rule.period.unit());
        } else {
            let _ = write!(text, "every {} {}s", rule.interval, rule.period.unit());
        }
        if let Some(end) = rule.end {
            let _ = write!(text, " until {}", end.with_timezone(tz).format(DATE_FORMAT));
        }
        text.push('\n');
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// " (starts in 2 days 3 hours)". Minutes are only shown for the last day.
fn format_time_remaining(time_until: Duration) -> String {
    if time_until <= Duration::zero() {
        return " (the event has started)".into();
    }
    let days = time_until.num_days();
    let hours = time_until.num_hours() % 24;
    let minutes = time_until.num_minutes() % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 && days == 0 {
        parts.push(plural(minutes, "minute"));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" (starts in {})", parts.join(" "))
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
