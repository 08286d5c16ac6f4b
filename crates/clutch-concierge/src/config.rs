use std::time::Duration;

use clutch_common::yelp::YelpClientConfig;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub yelp: YelpClientConfig,
    pub locale: String,
    pub reservation_delay: Duration,
    pub tcp_listen_addr: Option<String>,
}

impl Config {
    /// Required:
    /// - `YELP_API_KEY`
    ///
    /// Optional:
    /// - `YELP_AI_API_BASE` and the other `YELP_*` client knobs
    /// - `CLUTCH_LOCALE` (default: "en_US")
    /// - `CLUTCH_RESERVATION_DELAY_MS` (default: 1500)
    /// - `MCP_TCP_LISTEN_ADDR` (serve on TCP instead of stdio)
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var("YELP_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("YELP_API_KEY environment variable is required".to_string())
            })?;

        let locale = std::env::var("CLUTCH_LOCALE").unwrap_or_else(|_| "en_US".to_string());

        let reservation_delay = std::env::var("CLUTCH_RESERVATION_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(1_500));

        Ok(Self {
            yelp: YelpClientConfig::from_env(api_key),
            locale,
            reservation_delay,
            tcp_listen_addr: std::env::var("MCP_TCP_LISTEN_ADDR").ok(),
        })
    }
}
