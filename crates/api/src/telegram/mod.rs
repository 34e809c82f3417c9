mod webhook;

use actix_web::web;
use webhook::telegram_webhook_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/telegram/webhook",
        web::post().to(telegram_webhook_controller),
    );
}
