// src/main.rs
use actix_web::{ web, App, HttpServer };
use env_logger::Env;
use governor::RateLimiter;
use log::{error, info};
use std::sync::Arc;

use bzstat::clock::SystemClock;
use bzstat::config::Config;
use bzstat::directory::Directory;
use bzstat::handlers;
use bzstat::query::StatusQuery;
use bzstat::service::StatusService;
use bzstat::utils::ClientRateLimiter;

fn startup_error(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();
    info!(
        "Status TTL {}s, query timeout {}s, directory {:?}",
        config.status_ttl_secs, config.query_timeout_secs, config.directory_url
    );

    // Get bind address and port from environment or use defaults
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind = format!("{}:{}", bind_address, port);

    let directory = Directory::new(&config.directory_url, config.directory_timeout())
        .map_err(|e| startup_error(format!("Failed to build directory client: {}", e)))?;

    let clock = Arc::new(SystemClock);
    let query = StatusQuery::new(
        directory,
        clock.clone(),
        config.query_timeout(),
        config.max_response_bytes,
    );
    let service = web::Data::new(StatusService::new(Arc::new(query), clock, config.status_ttl()));

    let quota = config
        .status_quota()
        .ok_or_else(|| startup_error("STATUS_PERIOD_SECS and STATUS_BURST_LIMIT must be non-zero".to_string()))?;
    let status_rate_limiter: web::Data<ClientRateLimiter> = web::Data::new(RateLimiter::keyed(quota));

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(status_rate_limiter.clone())
            .route("/", web::get().to(handlers::index::index))
            .route("/status/{host}/{port}", web::get().to(handlers::status::get_status))
            .route("/widget", web::get().to(handlers::widget::get_widget))
    })
        .bind(&bind)?
        .run().await
}
