mod alert;
mod birthday;
mod error;
mod event;
mod job_schedulers;
mod shared;
mod status;
mod telegram;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
pub use alert::{AlertScheduler, EventAlertHooks};
use community_alerts_infra::AlertsContext;
use job_schedulers::{start_alert_scheduler_job, start_birthday_job};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    event::configure_routes(cfg);
    status::configure_routes(cfg);
    telegram::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: AlertsContext) -> Result<Self, std::io::Error> {
        let scheduler = AlertScheduler::new(context.clone());
        let (server, port) =
            Application::configure_server(context.clone(), scheduler.clone()).await?;
        Application::start_job_schedulers(context, scheduler);

        Ok(Self { server, port })
    }

    /// Same as `new` without the background jobs, the scheduler is then
    /// driven by the caller
    pub async fn without_jobs(context: AlertsContext) -> Result<Self, std::io::Error> {
        let scheduler = AlertScheduler::new(context.clone());
        let (server, port) = Application::configure_server(context, scheduler).await?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: AlertsContext, scheduler: AlertScheduler) {
        start_alert_scheduler_job(scheduler, context.clone());
        start_birthday_job(context);
    }

    async fn configure_server(
        context: AlertsContext,
        scheduler: AlertScheduler,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(context.clone()))
                .app_data(web::Data::new(scheduler.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
