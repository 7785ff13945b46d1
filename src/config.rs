use std::env;
use std::num::NonZeroU32;
use std::time::Duration;
use governor::Quota;

use crate::directory::DEFAULT_DIRECTORY_URL;

#[derive(Clone, Debug)]
pub struct Config {
    // Cache
    pub status_ttl_secs: u64,

    // Outbound queries
    pub query_timeout_secs: u64,
    pub max_response_bytes: usize,
    pub directory_url: String,
    pub directory_timeout_secs: u64,

    // Rate limiting configs
    pub status_period_secs: u64,
    pub status_burst_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_ttl_secs: 300, // 5 minutes
            query_timeout_secs: 5,
            max_response_bytes: 64 * 1024,
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            directory_timeout_secs: 5,
            status_period_secs: 1,
            status_burst_limit: 30,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            status_ttl_secs: env_or("STATUS_TTL_SECS", defaults.status_ttl_secs),
            query_timeout_secs: env_or("QUERY_TIMEOUT_SECS", defaults.query_timeout_secs),
            max_response_bytes: env_or("MAX_RESPONSE_BYTES", defaults.max_response_bytes),
            // empty string disables directory lookups
            directory_url: env::var("DIRECTORY_URL").unwrap_or(defaults.directory_url),
            directory_timeout_secs: env_or("DIRECTORY_TIMEOUT_SECS", defaults.directory_timeout_secs),
            status_period_secs: env_or("STATUS_PERIOD_SECS", defaults.status_period_secs),
            status_burst_limit: env_or("STATUS_BURST_LIMIT", defaults.status_burst_limit),
        }
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    /// `None` when the period or burst limit is zero.
    pub fn status_quota(&self) -> Option<Quota> {
        let burst = NonZeroU32::new(self.status_burst_limit)?;
        Quota::with_period(Duration::from_secs(self.status_period_secs))
            .map(|quota| quota.allow_burst(burst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = Config::default();
        assert_eq!(config.status_ttl(), Duration::from_secs(300));
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
        assert!(config.status_quota().is_some());
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let config = Config {
            status_burst_limit: 0,
            ..Config::default()
        };
        assert!(config.status_quota().is_none());

        let config = Config {
            status_period_secs: 0,
            ..Config::default()
        };
        assert!(config.status_quota().is_none());
    }
}
