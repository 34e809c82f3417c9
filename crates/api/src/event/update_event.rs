use crate::alert::{AlertScheduler, EventAlertHooks};
use crate::error::AlertsError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use community_alerts_api_structs::update_event::*;
use community_alerts_domain::{Event, ID};
use community_alerts_infra::AlertsContext;

pub async fn update_event_controller(
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlertsContext>,
    scheduler: web::Data<AlertScheduler>,
) -> Result<HttpResponse, AlertsError> {
    let usecase = UpdateEventUseCase {
        event_id: path_params.event_id.clone(),
        changes: body.0,
    };

    let event = execute(usecase, &ctx).await.map_err(AlertsError::from)?;
    let alerted_members = scheduler.on_event_updated(&event).await;

    Ok(HttpResponse::Ok().json(APIResponse::new(event, alerted_members)))
}

/// Applies the given fields to a stored `Event`. Fields left out are kept.
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub event_id: ID,
    pub changes: RequestBody,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    NotFound(ID),
    EmptyTitle,
    InvalidRepeatInterval(i64),
    MissingRepeatPeriod,
    StorageError,
}

impl From<UseCaseErrors> for AlertsError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::NotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseErrors::EmptyTitle => Self::BadClientData("The event needs a title".into()),
            UseCaseErrors::InvalidRepeatInterval(interval) => Self::BadClientData(format!(
                "The repeat interval: {}, must be at least 1",
                interval
            )),
            UseCaseErrors::MissingRepeatPeriod => {
                Self::BadClientData("A repeating event needs a repeat period".into())
            }
            UseCaseErrors::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = Event;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let mut e = match ctx.repos.events.find(&self.event_id).await {
            Some(e) => e,
            None => return Err(UseCaseErrors::NotFound(self.event_id.clone())),
        };

        let changes = &self.changes;
        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err(UseCaseErrors::EmptyTitle);
            }
            e.title = title.clone();
        }
        if let Some(description) = &changes.description {
            e.description = description.clone();
        }
        if let Some(date) = changes.date {
            e.set_date(date);
        }
        if let Some(place_type) = changes.place_type {
            e.place_type = place_type;
        }
        if let Some(place) = &changes.place {
            e.place = place.clone();
        }
        if let Some(custom_place_type) = &changes.custom_place_type {
            e.custom_place_type = custom_place_type.clone();
        }
        if let Some(event_type) = &changes.event_type {
            e.event_type = event_type.clone();
        }
        if let Some(open) = changes.open {
            e.open = open;
        }
        if let Some(hosts) = &changes.hosts {
            e.hosts = hosts.clone();
        }

        if let Some(interval) = changes.repeat_interval {
            if interval < 1 {
                return Err(UseCaseErrors::InvalidRepeatInterval(interval));
            }
        }
        if changes.is_repeating == Some(false) {
            e.set_recurrence(None, None, None);
        } else if changes.is_repeating == Some(true)
            || changes.repeat_period.is_some()
            || changes.repeat_interval.is_some()
            || changes.repeat_end_date.is_some()
        {
            let period = changes.repeat_period.or(e.repeat_period);
            if changes.is_repeating == Some(true) && period.is_none() {
                return Err(UseCaseErrors::MissingRepeatPeriod);
            }
            let interval = changes.repeat_interval.or(Some(e.repeat_interval));
            let end = changes.repeat_end_date.unwrap_or(e.repeat_end_date);
            e.set_recurrence(period, interval, end);
        }

        ctx.repos
            .events
            .save(&e)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{insert_event, setup_context};
    use chrono::{Duration, TimeZone, Utc};
    use community_alerts_domain::RepeatPeriod;

    #[actix_web::main]
    #[test]
    async fn moving_the_event_resets_the_dedup_stamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let mut event = Event::new("Rust meetup", now + Duration::days(2));
        event.last_repeating_alert_sent_at = Some(now - Duration::hours(1));
        insert_event(&ctx, &event).await;

        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                description: Some("Bring snacks".into()),
                ..Default::default()
            },
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert_eq!(updated.description, "Bring snacks");
        assert!(updated.last_repeating_alert_sent_at.is_some());

        let new_date = now + Duration::days(3);
        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                date: Some(new_date),
                ..Default::default()
            },
        };
        execute(usecase, &ctx).await.unwrap();
        let stored = ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(stored.date, new_date);
        assert!(stored.last_repeating_alert_sent_at.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn toggles_recurrence() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let event = Event::new("Standup", now + Duration::days(1));
        insert_event(&ctx, &event).await;

        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                repeat_period: Some(RepeatPeriod::Daily),
                ..Default::default()
            },
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert!(updated.is_repeating);
        assert_eq!(updated.repeat_interval, 1);

        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                is_repeating: Some(false),
                ..Default::default()
            },
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert!(!updated.is_repeating);
        assert!(updated.repeat_period.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn unknown_event() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let event_id = ID::new();
        let usecase = UpdateEventUseCase {
            event_id: event_id.clone(),
            changes: RequestBody::default(),
        };
        assert_eq!(
            execute(usecase, &ctx).await.unwrap_err(),
            UseCaseErrors::NotFound(event_id)
        );
    }

    #[actix_web::main]
    #[test]
    async fn repeating_needs_a_period() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let event = Event::new("Standup", now + Duration::days(1));
        insert_event(&ctx, &event).await;

        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                is_repeating: Some(true),
                ..Default::default()
            },
        };
        assert_eq!(
            execute(usecase, &ctx).await.unwrap_err(),
            UseCaseErrors::MissingRepeatPeriod
        );

        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes: RequestBody {
                is_repeating: Some(true),
                repeat_period: Some(RepeatPeriod::Weekly),
                ..Default::default()
            },
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert!(updated.is_repeating);
        assert_eq!(updated.repeat_period, Some(RepeatPeriod::Weekly));
    }

    #[actix_web::main]
    #[test]
    async fn repeat_end_date_can_be_removed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let end = now + Duration::days(30);
        let mut event = Event::new("Standup", now + Duration::days(1));
        event.set_recurrence(Some(RepeatPeriod::Daily), Some(2), Some(end));
        insert_event(&ctx, &event).await;

        let changes: RequestBody = serde_json::from_str(r#"{"title":"Daily standup"}"#).unwrap();
        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes,
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert_eq!(updated.repeat_end_date, Some(end));

        let changes: RequestBody = serde_json::from_str(r#"{"repeatEndDate":null}"#).unwrap();
        let usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            changes,
        };
        let updated = execute(usecase, &ctx).await.unwrap();
        assert!(updated.is_repeating);
        assert_eq!(updated.repeat_interval, 2);
        assert_eq!(updated.repeat_end_date, None);
    }
}
