// src/handlers/status.rs
use actix_web::{ web, HttpRequest, HttpResponse };
use log::debug;
use serde::Serialize;

use crate::models::status::QueryOutcome;
use crate::service::StatusService;
use crate::utils::{ check_rate_limit, parse_port, ClientRateLimiter, RequestError };

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub host: String,
    pub port: u16,
    #[serde(flatten)]
    pub outcome: QueryOutcome,
    pub enabled_options: Vec<&'static str>,
    pub updated_minutes_ago: Option<u64>,
}

pub async fn status_view(service: &StatusService, host: String, port: u16) -> StatusView {
    // Every status lookup sweeps expired slots, whichever route asked.
    service.cleanup_stale_entries();
    debug!("Status requested for {}:{} ({} cached)", host, port, service.cached_entries());

    let outcome = service.status(&host, port).await;
    let enabled_options = outcome
        .record()
        .map(|r| r.options.enabled_names())
        .unwrap_or_default();
    let updated_minutes_ago = outcome.record().map(|r| r.minutes_since(service.now()));

    StatusView {
        host,
        port,
        outcome,
        enabled_options,
        updated_minutes_ago,
    }
}

pub async fn get_status(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    service: web::Data<StatusService>,
    rate_limiter: web::Data<ClientRateLimiter>
) -> Result<HttpResponse, RequestError> {
    check_rate_limit(&req, &rate_limiter)?;

    let (host, port) = path.into_inner();
    let port = parse_port(&port)?;

    let view = status_view(&service, host, port).await;
    Ok(HttpResponse::Ok().json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::status::{GameMode, GameOptions, StatusRecord, TeamMaxima};
    use crate::service::StatusSource;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use governor::{Quota, RateLimiter};
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedSource;

    #[async_trait]
    impl StatusSource for FixedSource {
        async fn query(&self, host: &str, _port: u16) -> QueryOutcome {
            if host == "down.example" {
                return QueryOutcome::Unreachable;
            }
            QueryOutcome::Success(StatusRecord {
                display_name: Some("Fixed".to_string()),
                protocol_version: "0221".to_string(),
                game_mode: GameMode::RabbitChase,
                max_players: TeamMaxima::from_wire_order([4, 0, 0, 0, 0]),
                options: GameOptions::from_bits(0x0022),
                players: Vec::new(),
                reported_ip: "10.0.0.1".to_string(),
                fetched_at: 0,
            })
        }
    }

    fn limiter(burst: u32) -> web::Data<ClientRateLimiter> {
        let quota = Quota::per_minute(NonZeroU32::new(burst).unwrap());
        web::Data::new(RateLimiter::keyed(quota))
    }

    fn service() -> web::Data<StatusService> {
        let clock = Arc::new(ManualClock::new(600));
        web::Data::new(StatusService::new(Arc::new(FixedSource), clock, Duration::from_secs(300)))
    }

    #[actix_web::test]
    async fn reports_success_and_unreachable() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .app_data(limiter(10))
                .route("/status/{host}/{port}", web::get().to(get_status)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/status/up.example/5154")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["host"], "up.example");
        assert_eq!(body["game_mode"], "RabbitChase");
        assert_eq!(body["updated_minutes_ago"], 10);
        assert_eq!(body["protocol_version"], "0221");
        assert_eq!(body["enabled_options"], serde_json::json!(["flags", "ricochet"]));

        let req = test::TestRequest::get()
            .uri("/status/down.example/5154")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "unreachable");
        assert!(body["updated_minutes_ago"].is_null());
        assert_eq!(body["enabled_options"], serde_json::json!([]));
        assert!(body.get("players").is_none());
    }

    #[actix_web::test]
    async fn rejects_bad_port_and_excess_requests() {
        let app = test::init_service(
            App::new()
                .app_data(service())
                .app_data(limiter(1))
                .route("/status/{host}/{port}", web::get().to(get_status)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/status/up.example/0")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::get()
            .uri("/status/up.example/5154")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);
    }
}
