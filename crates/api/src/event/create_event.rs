use crate::alert::{AlertScheduler, EventAlertHooks};
use crate::error::AlertsError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use community_alerts_api_structs::create_event::*;
use community_alerts_domain::{Event, EventHost, PlaceType, RepeatPeriod};
use community_alerts_infra::AlertsContext;

pub async fn create_event_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<AlertsContext>,
    scheduler: web::Data<AlertScheduler>,
) -> Result<HttpResponse, AlertsError> {
    let body = body.0;
    let usecase = CreateEventUseCase {
        title: body.title,
        description: body.description.unwrap_or_default(),
        date: body.date,
        place_type: body.place_type.unwrap_or(PlaceType::Online),
        place: body.place.unwrap_or_default(),
        custom_place_type: body.custom_place_type.unwrap_or_default(),
        event_type: body.event_type.unwrap_or_default(),
        open: body.open.unwrap_or(true),
        hosts: body.hosts.unwrap_or_default(),
        repeat_period: body.repeat_period,
        repeat_interval: body.repeat_interval,
        repeat_end_date: body.repeat_end_date,
    };

    let event = execute(usecase, &ctx).await.map_err(AlertsError::from)?;
    let alerted_members = scheduler.on_event_created(&event).await;

    Ok(HttpResponse::Created().json(APIResponse::new(event, alerted_members)))
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub place_type: PlaceType,
    pub place: String,
    pub custom_place_type: String,
    pub event_type: String,
    pub open: bool,
    pub hosts: Vec<EventHost>,
    pub repeat_period: Option<RepeatPeriod>,
    pub repeat_interval: Option<i64>,
    pub repeat_end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    EmptyTitle,
    InvalidRepeatInterval(i64),
    StorageError,
}

impl From<UseCaseErrors> for AlertsError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::EmptyTitle => Self::BadClientData("The event needs a title".into()),
            UseCaseErrors::InvalidRepeatInterval(interval) => Self::BadClientData(format!(
                "The repeat interval: {}, must be at least 1",
                interval
            )),
            UseCaseErrors::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = Event;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        if self.title.trim().is_empty() {
            return Err(UseCaseErrors::EmptyTitle);
        }
        match self.repeat_interval {
            Some(interval) if interval < 1 => {
                return Err(UseCaseErrors::InvalidRepeatInterval(interval))
            }
            _ => (),
        }

        let mut e = Event::new(self.title.clone(), self.date);
        e.description = self.description.clone();
        e.place_type = self.place_type;
        e.place = self.place.clone();
        e.custom_place_type = self.custom_place_type.clone();
        e.event_type = self.event_type.clone();
        e.open = self.open;
        e.hosts = self.hosts.clone();
        e.set_recurrence(self.repeat_period, self.repeat_interval, self.repeat_end_date);

        ctx.repos
            .events
            .insert(&e)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(e)
    }
}
