//! Relayer configuration, loaded from the environment (with `.env`
//! support).

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::time::Duration;

use crate::writers::RetryConfig;

/// Relayer configuration.
#[derive(Clone)]
pub struct Config {
    /// Ids of the chains to watch and settle on.
    pub chain_ids: Vec<u64>,
    /// Hex-encoded gateway private key. When unset, the binary generates an
    /// ephemeral devnet key at startup.
    pub gateway_private_key: Option<String>,
    /// Event log poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of the observed-swap queue between watchers and submitter.
    pub channel_capacity: usize,
    /// Maximum redeem retry attempts for transient failures.
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds.
    pub retry_backoff_ms: u64,
    /// Health/metrics server port.
    pub health_port: u16,
}

/// Custom Debug that redacts the private key to prevent accidental log
/// leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("chain_ids", &self.chain_ids)
            .field(
                "gateway_private_key",
                &self.gateway_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("channel_capacity", &self.channel_capacity)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("health_port", &self.health_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        let chain_ids = parse_chain_ids(
            &env::var("CHAIN_IDS").unwrap_or_else(|_| "1,2".to_string()),
        )?;

        Ok(Self {
            chain_ids,
            gateway_private_key: env::var("GATEWAY_PRIVATE_KEY").ok(),
            poll_interval_ms: parse_or("POLL_INTERVAL_MS", 500)?,
            channel_capacity: parse_or("CHANNEL_CAPACITY", 256)?,
            max_retries: parse_or("RETRY_MAX_ATTEMPTS", 5)?,
            retry_backoff_ms: parse_or("RETRY_BACKOFF_MS", 2000)?,
            health_port: parse_or("HEALTH_PORT", 3000)?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.retry_backoff_ms),
            ..RetryConfig::default()
        }
    }
}

/// Parse a comma-separated chain id list, e.g. "1,2".
fn parse_chain_ids(raw: &str) -> Result<Vec<u64>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .wrap_err_with(|| format!("Invalid chain id: {part}"))
        })
        .collect::<Result<Vec<u64>>>()?;
    if ids.len() < 2 {
        return Err(eyre!("CHAIN_IDS must name at least two chains, got {raw:?}"));
    }
    Ok(ids)
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(value) => value
            .parse::<T>()
            .wrap_err_with(|| format!("Invalid value for {var}")),
        Err(_) => Ok(default),
    }
}
