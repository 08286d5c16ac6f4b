use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai_chat::{ChatRequest, ChatResponse, UserContext};

pub const DEFAULT_AI_CHAT_URL: &str = "https://api.yelp.com/ai/chat/v2";

#[derive(Clone)]
pub struct YelpClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl YelpClientConfig {
    /// Everything but the API key comes from the environment with defaults;
    /// the key is resolved (and required) by the caller's config layer.
    pub fn from_env(api_key: String) -> Self {
        let base_url =
            std::env::var("YELP_AI_API_BASE").unwrap_or_else(|_| DEFAULT_AI_CHAT_URL.to_string());

        let default_timeout = std::env::var("YELP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_retries = std::env::var("YELP_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let initial_backoff = std::env::var("YELP_RETRY_INITIAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(250));

        let max_backoff = std::env::var("YELP_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(4_000));

        let max_error_body_bytes = std::env::var("YELP_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
        }
    }
}

impl std::fmt::Debug for YelpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YelpClientConfig")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("max_error_body_bytes", &self.max_error_body_bytes)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum YelpClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Yelp AI API request failed: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Yelp AI API request failed: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("invalid response from Yelp AI API: {0}")]
    InvalidResponse(&'static str),

    #[error("query cannot be empty")]
    EmptyQuery,
}

#[derive(Clone)]
pub struct YelpClient {
    config: YelpClientConfig,
    http: reqwest::Client,
}

impl YelpClient {
    pub fn new(config: YelpClientConfig) -> Result<Self, YelpClientError> {
        let http = reqwest::Client::builder()
            .user_agent("clutch/concierge")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &YelpClientConfig {
        &self.config
    }

    /// Sends one chat turn. `chat_id` threads a previous conversation through.
    pub async fn send_chat_message(
        &self,
        query: &str,
        chat_id: Option<&str>,
        user_context: Option<UserContext>,
    ) -> Result<ChatResponse, YelpClientError> {
        let request = build_chat_request(query, chat_id, user_context)?;
        debug!(
            continuing = request.chat_id.is_some(),
            has_context = request.user_context.is_some(),
            "sending yelp ai chat request"
        );

        let response: ChatResponse = self
            .request_with_retry(|| {
                let req = request.clone();
                async move {
                    let resp = self
                        .http
                        .post(&self.config.base_url)
                        .bearer_auth(&self.config.api_key)
                        .timeout(self.config.default_timeout)
                        .json(&req)
                        .send()
                        .await?;
                    Self::parse_json_response(resp, self.config.max_error_body_bytes).await
                }
            })
            .await?;

        validate_chat_response(response)
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, YelpClientError> {
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> YelpClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<YelpErrorEnvelope>(&body) {
            let message = parsed
                .error
                .description
                .or(parsed.error.code)
                .unwrap_or_else(|| "unknown upstream error".to_string());
            return YelpClientError::Upstream { status, message };
        }
        YelpClientError::UpstreamBody { status, body }
    }

    /// Only failures where the request never reached Yelp are retried: a
    /// chat turn is not idempotent, so a timed-out or failed POST may
    /// already be part of the conversation.
    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, YelpClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, YelpClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "yelp request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn build_chat_request(
    query: &str,
    chat_id: Option<&str>,
    user_context: Option<UserContext>,
) -> Result<ChatRequest, YelpClientError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(YelpClientError::EmptyQuery);
    }
    Ok(ChatRequest {
        query: query.to_string(),
        chat_id: chat_id.filter(|id| !id.is_empty()).map(str::to_string),
        user_context,
    })
}

fn validate_chat_response(response: ChatResponse) -> Result<ChatResponse, YelpClientError> {
    if response.response.text.is_empty() {
        return Err(YelpClientError::InvalidResponse("missing response.text"));
    }
    if response.chat_id.is_empty() {
        return Err(YelpClientError::InvalidResponse("missing chat_id"));
    }
    Ok(response)
}

fn should_retry(err: &YelpClientError) -> bool {
    match err {
        YelpClientError::Request(e) => e.is_connect() && !e.is_timeout(),
        YelpClientError::Upstream { .. }
        | YelpClientError::UpstreamBody { .. }
        | YelpClientError::InvalidJson(_)
        | YelpClientError::InvalidResponse(_)
        | YelpClientError::EmptyQuery => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    (now.subsec_nanos() as u64) % (max_inclusive + 1)
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct YelpErrorEnvelope {
    error: YelpErrorObject,
}

#[derive(Debug, Deserialize)]
struct YelpErrorObject {
    code: Option<String>,
    description: Option<String>,
}
