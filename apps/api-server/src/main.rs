//! # Quota API Server
//!
//! Actix-web front for the daily usage-quota ledger.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::request_id::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting quota API server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config);

    #[cfg(feature = "scheduler")]
    let mut scheduler = {
        use background::scheduler::{Scheduler, SchedulerConfig};

        let scheduler = Scheduler::new(SchedulerConfig::from_env()).await?;
        scheduler.add_ledger_sweep(state.ledger.clone()).await?;
        scheduler.start().await?;
        scheduler
    };

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    scheduler.shutdown().await?;

    tracing::info!("Quota API server stopped");
    Ok(())
}
