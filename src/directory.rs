// src/directory.rs
use std::time::Duration;

use log::{debug, info, warn};

/// Public server list published by the BZFlag list server.
pub const DEFAULT_DIRECTORY_URL: &str = "https://my.bzflag.org/db/?action=LIST";

/// Finds the display name of `host:port` in a directory listing.
///
/// Lines are matched case-insensitively on the `host:port` substring and the
/// last matching line wins. The name is every token after the token equal to
/// `reported_ip`, joined by single spaces.
pub fn resolve_name<'a, I>(host: &str, port: u16, reported_ip: &str, listing: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = format!("{}:{}", host, port).to_lowercase();

    let line = listing
        .into_iter()
        .filter(|line| line.to_lowercase().contains(&needle))
        .last()?;

    let mut tokens = line.split_whitespace();
    tokens.by_ref().find(|token| *token == reported_ip)?;

    let name = tokens.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// HTTP client for the public server directory.
#[derive(Debug, Clone)]
pub struct Directory {
    client: reqwest::Client,
    url: Option<String>,
}

impl Directory {
    /// An empty `url` disables lookups.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let url = if url.trim().is_empty() {
            info!("Directory lookups disabled");
            None
        } else {
            Some(url.to_string())
        };
        Ok(Self { client, url })
    }

    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
        }
    }

    async fn fetch_listing(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }

    /// Resolves a display name, treating any fetch failure as "not listed".
    pub async fn lookup(&self, host: &str, port: u16, reported_ip: &str) -> Option<String> {
        let url = self.url.as_deref()?;

        let listing = match self.fetch_listing(url).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Failed to fetch directory listing from {}: {}", url, e);
                return None;
            }
        };

        let name = resolve_name(host, port, reported_ip, listing.lines());
        match &name {
            Some(name) => debug!("Resolved {}:{} to {:?}", host, port, name),
            None => debug!("No directory entry for {}:{}", host, port),
        }
        name
    }
}
