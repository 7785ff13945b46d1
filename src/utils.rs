// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use log::{debug, warn};
use std::net::IpAddr;
use thiserror::Error;

use crate::models::widget::ParamError;

pub type ClientRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to extract client IP")]
    MissingPeerIP,
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid widget parameters: {0}")]
    InvalidParams(#[from] ParamError),
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => HttpResponse::TooManyRequests().body(self.to_string()),
            _ => HttpResponse::BadRequest().body(self.to_string()),
        }
    }
}

pub fn client_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    req.peer_addr()
        .map(|addr| addr.ip())
        .ok_or(RequestError::MissingPeerIP)
}

/// Rejects the request when `limiter` has no capacity left for its client.
pub fn check_rate_limit(req: &HttpRequest, limiter: &ClientRateLimiter) -> Result<IpAddr, RequestError> {
    let ip = client_ip(req)?;
    if limiter.check_key(&ip).is_err() {
        warn!("Rate limit exceeded for {}", ip);
        return Err(RequestError::RateLimitExceeded);
    }
    debug!("Accepted request from {}", ip);
    Ok(ip)
}

pub fn parse_port(raw: &str) -> Result<u16, RequestError> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(RequestError::InvalidPort(raw.to_string())),
        Ok(port) => Ok(port),
    }
}
