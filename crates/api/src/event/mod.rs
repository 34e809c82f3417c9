mod create_event;
mod event_created;
mod get_event_subscriptions;
mod update_event;

use actix_web::web;
use create_event::create_event_controller;
use event_created::event_created_controller;
use get_event_subscriptions::get_event_subscriptions_controller;
use update_event::update_event_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event_controller));
    cfg.route("/events/{event_id}", web::put().to(update_event_controller));
    cfg.route(
        "/events/{event_id}/created",
        web::post().to(event_created_controller),
    );
    cfg.route(
        "/events/{event_id}/subscriptions",
        web::get().to(get_event_subscriptions_controller),
    );
}
