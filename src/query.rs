// src/query.rs
use async_trait::async_trait;
use log::{debug, info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::clock::Clock;
use crate::directory::Directory;
use crate::models::status::{QueryOutcome, StatusRecord};
use crate::protocol::{decode, status_request, DecodeError};
use crate::service::StatusSource;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("no complete response within {0:?}")]
    Timeout(Duration),
    #[error("response exceeds {0} bytes")]
    ResponseTooLarge(usize),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Asks one game server for its status and enriches the answer with the
/// directory display name.
pub struct StatusQuery {
    directory: Directory,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    max_response_bytes: usize,
}

impl StatusQuery {
    pub fn new(directory: Directory, clock: Arc<dyn Clock>, timeout: Duration, max_response_bytes: usize) -> Self {
        Self {
            directory,
            clock,
            timeout,
            max_response_bytes,
        }
    }

    async fn exchange(&self, host: &str, port: u16) -> Result<Vec<u8>, QueryError> {
        let mut stream = TcpStream::connect((host, port))
            .await
            .map_err(QueryError::Connect)?;
        stream.write_all(&status_request()).await?;

        let limit = self.max_response_bytes;
        let mut raw = Vec::new();
        (&mut stream)
            .take(limit as u64 + 1)
            .read_to_end(&mut raw)
            .await?;
        if raw.len() > limit {
            return Err(QueryError::ResponseTooLarge(limit));
        }

        debug!("Read {} bytes from {}:{}", raw.len(), host, port);
        Ok(raw)
    }

    async fn fetch(&self, host: &str, port: u16) -> Result<StatusRecord, QueryError> {
        let raw = tokio::time::timeout(self.timeout, self.exchange(host, port))
            .await
            .map_err(|_| QueryError::Timeout(self.timeout))??;
        let report = decode(&raw)?;

        let display_name = self.directory.lookup(host, port, &report.reported_ip).await;
        Ok(StatusRecord::from_report(report, display_name, self.clock.now()))
    }

    /// Runs a single status query. Every failure collapses to `Unreachable`.
    pub async fn query(&self, host: &str, port: u16) -> QueryOutcome {
        match self.fetch(host, port).await {
            Ok(record) => {
                info!(
                    "{}:{} is up: {} with {} player(s)",
                    host,
                    port,
                    record.game_mode,
                    record.players.len()
                );
                QueryOutcome::Success(record)
            }
            Err(e) => {
                warn!("Status query to {}:{} failed: {}", host, port, e);
                QueryOutcome::Unreachable
            }
        }
    }
}

#[async_trait]
impl StatusSource for StatusQuery {
    async fn query(&self, host: &str, port: u16) -> QueryOutcome {
        StatusQuery::query(self, host, port).await
    }
}
