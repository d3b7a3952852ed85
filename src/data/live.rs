//! Live IPO feed backed by the Gemini generative search API
//!
//! This module provides the external fetch collaborator: an async client
//! that asks the model for current Indian IPO data (with Google Search
//! grounding), extracts the JSON payload out of the model's free-text
//! answer, and classifies failures so the cache layer can pick the right
//! fallback. Rate-limited calls are retried internally with exponential
//! backoff; every other failure surfaces after a single attempt.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{GroundingSource, IpoRecord};

/// Base URL for the Generative Language API
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for both the live sweep and per-record insights
const MODEL_NAME: &str = "gemini-3-pro-preview";

/// Error-body marker the API emits when the key does not match the
/// selected project/model
const AUTH_MISMATCH_MARKER: &str = "Requested entity was not found";

/// Insight text served when no API key is configured. Callers treat it as
/// transient and must not cache it.
pub const OFFLINE_INSIGHT: &str = "Analytics unavailable offline.";

/// Errors that can occur when talking to the live feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// Quota exhausted (HTTP 429); the only retryable kind
    #[error("live feed rate limited: {0}")]
    RateLimited(String),

    /// Credential/key selection invalid for the requested entity
    #[error("API key mismatch: {0}")]
    AuthMismatch(String),

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status that is neither a rate limit nor a
    /// key mismatch
    #[error("live feed returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response arrived but no usable payload could be extracted
    #[error("malformed live payload: {0}")]
    Payload(String),
}

impl FeedError {
    /// Whether the internal retry loop should try again.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FeedError::RateLimited(_))
    }
}

/// The external fetch collaborator consumed by the cache layer
///
/// Implementations are expected to be idempotent reads of market data;
/// overlapping calls may both hit the backing service.
#[async_trait]
pub trait LiveFeed: Send + Sync {
    /// Fetches the current IPO list. An empty Ok means the feed had
    /// nothing usable to say (e.g. missing credentials); callers treat
    /// it the same as a failure.
    async fn fetch_live(&self) -> Result<Vec<IpoRecord>, FeedError>;

    /// Fetches a short analyst insight for a single record.
    async fn fetch_insight(&self, record: &IpoRecord) -> Result<String, FeedError>;
}

/// Bounded retry configuration for the live fetch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(2000),
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. Only rate-limited failures are retried.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Err(err) if err.is_rate_limited() && attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "live feed rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            other => return other,
        }
    }
}

/// Client for the Gemini generateContent endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Creates a client. A missing API key is tolerated: the live fetch
    /// then resolves to an empty list and the cache layer degrades.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the API base URL (for testing).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the retry policy.
    #[allow(dead_code)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn live_prompt() -> String {
        "You are a Real-Time Financial Data Engine. Provide accurate Indian IPO data \
         for Mainboard and SME markets.\n\
         \n\
         Instructions:\n\
         1. Use Google Search Grounding (Chittorgarh, NSE, BSE, Zerodha).\n\
         2. Verify GMP across sources.\n\
         3. Subscription status must show consolidated 'X-times'.\n\
         \n\
         Return a JSON array of objects strictly following this schema:\n\
         {\n\
           \"id\": \"string\",\n\
           \"name\": \"string\",\n\
           \"priceBand\": \"string\",\n\
           \"lotSize\": number,\n\
           \"gmp\": number,\n\
           \"subscription\": \"string\",\n\
           \"status\": \"Open\" | \"Upcoming\" | \"Closed\",\n\
           \"type\": \"Mainboard\" | \"SME\",\n\
           \"sector\": \"string\"\n\
         }\n\
         \n\
         IMPORTANT: Return ONLY the raw JSON array. No markdown, no text."
            .to_string()
    }

    fn insight_prompt(record: &IpoRecord) -> String {
        format!(
            "Brief analyst insight for: {}\n\
             Sector: {}\n\
             Price: {}\n\
             GMP: ₹{}\n\
             Subscription: {}\n\
             \n\
             Provide 2 sentences on market sentiment and risk/reward. No financial advice.",
            record.name,
            record.sector.as_deref().unwrap_or("Unknown"),
            record.price_band,
            record.gmp,
            record.subscription,
        )
    }

    async fn generate(&self, api_key: &str, prompt: &str, grounded: bool) -> Result<GenerateContentResponse, FeedError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, MODEL_NAME, api_key
        );

        let mut body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if grounded {
            body["tools"] = serde_json::json!([{ "google_search": {} }]);
        }

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &message));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }

    async fn fetch_live_once(&self) -> Result<Vec<IpoRecord>, FeedError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("API key missing, skipping live fetch");
            return Ok(Vec::new());
        };

        let payload = self.generate(api_key, &Self::live_prompt(), true).await?;

        let text = payload.candidate_text();
        if text.is_empty() {
            return Err(FeedError::Payload("no data returned".to_string()));
        }

        let sources = payload.grounding_sources();
        let records = parse_live_records(&text, &sources, Utc::now().timestamp_millis())?;
        debug!(count = records.len(), "live fetch parsed");
        Ok(records)
    }
}

#[async_trait]
impl LiveFeed for GeminiClient {
    async fn fetch_live(&self) -> Result<Vec<IpoRecord>, FeedError> {
        with_retry(&self.retry, || self.fetch_live_once()).await
    }

    async fn fetch_insight(&self, record: &IpoRecord) -> Result<String, FeedError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(OFFLINE_INSIGHT.to_string());
        };

        let payload = self
            .generate(api_key, &Self::insight_prompt(record), false)
            .await?;

        let text = payload.candidate_text();
        if text.is_empty() {
            Ok("Insight unavailable.".to_string())
        } else {
            Ok(text)
        }
    }
}

/// Maps a non-success HTTP response onto the feed error taxonomy.
fn classify_http_failure(status: StatusCode, body: &str) -> FeedError {
    let message = extract_api_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    if status == StatusCode::TOO_MANY_REQUESTS {
        FeedError::RateLimited(message)
    } else if body.contains(AUTH_MISMATCH_MARKER) {
        FeedError::AuthMismatch(message)
    } else {
        FeedError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pulls the human-readable message out of a Gemini error envelope.
fn extract_api_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: ApiError,
    }
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|e| e.error.message)
}

/// Slices the first `[` through the last `]` out of the model's answer.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Removes `[n]` citation markers the model sprinkles into grounded answers.
fn strip_citation_markers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        if c == '[' {
            let rest = &input[i + 1..];
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 && rest[digits..].starts_with(']') {
                for _ in 0..digits + 1 {
                    chars.next();
                }
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Parses the extracted array into records, dropping individual elements
/// that do not deserialize and keeping the rest.
fn parse_live_records(
    text: &str,
    sources: &[GroundingSource],
    now_ms: i64,
) -> Result<Vec<IpoRecord>, FeedError> {
    let array = extract_json_array(text)
        .ok_or_else(|| FeedError::Payload("invalid format: no JSON array".to_string()))?;
    let cleaned = strip_citation_markers(array);

    let values: Vec<serde_json::Value> =
        serde_json::from_str(&cleaned).map_err(|e| FeedError::Payload(e.to_string()))?;

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<IpoRecord>(value) {
            Ok(mut record) => {
                if record.id.is_empty() {
                    record.id = format!("live-{}-{}", index, now_ms);
                }
                record.is_live = true;
                if !sources.is_empty() {
                    record.grounding_sources = Some(sources.to_vec());
                }
                records.push(record);
            }
            Err(err) => {
                warn!(index, %err, "dropping unparsable live record");
            }
        }
    }

    Ok(records)
}

/// Response shape of the generateContent endpoint (the subset we read)
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    title: String,
    #[serde(default)]
    uri: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Web grounding citations of the first candidate.
    fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .map(|web| GroundingSource {
                        title: web.title.clone(),
                        uri: web.uri.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_extract_json_array_with_surrounding_prose() {
        let text = "Here is the data:\n[{\"a\":1}]\nHope that helps!";
        assert_eq!(extract_json_array(text), Some("[{\"a\":1}]"));
    }

    #[test]
    fn test_extract_json_array_missing_brackets() {
        assert!(extract_json_array("no json here").is_none());
        assert!(extract_json_array("only open [").is_none());
        assert!(extract_json_array("] reversed [").is_none());
    }

    #[test]
    fn test_strip_citation_markers_removes_numeric_refs() {
        let input = "{\"name\":\"Acme\"[1],\"gmp\":45}[12]";
        assert_eq!(strip_citation_markers(input), "{\"name\":\"Acme\",\"gmp\":45}");
    }

    #[test]
    fn test_strip_citation_markers_keeps_non_numeric_brackets() {
        let input = "[{\"subscription\":\"[NA]\"}]";
        assert_eq!(strip_citation_markers(input), input);
    }

    #[test]
    fn test_strip_citation_markers_preserves_multibyte_text() {
        let input = "{\"priceBand\":\"₹108 - ₹114\"}[3]";
        assert_eq!(strip_citation_markers(input), "{\"priceBand\":\"₹108 - ₹114\"}");
    }

    #[test]
    fn test_parse_live_records_marks_live_and_generates_ids() {
        let text = r#"[
            {"name":"Acme Ltd","type":"Mainboard","status":"Open",
             "priceBand":"₹100 - ₹110","lotSize":130,"gmp":12,"subscription":"3.4x"}
        ]"#;

        let records = parse_live_records(text, &[], 1_700_000_000_000).expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].is_live);
        assert_eq!(records[0].id, "live-0-1700000000000");
    }

    #[test]
    fn test_parse_live_records_keeps_producer_id() {
        let text = r#"[
            {"id":"acme-2026","name":"Acme Ltd","type":"SME","status":"Upcoming",
             "priceBand":"₹55","lotSize":2000,"gmp":7,"subscription":"N/A"}
        ]"#;

        let records = parse_live_records(text, &[], 0).expect("parse");
        assert_eq!(records[0].id, "acme-2026");
    }

    #[test]
    fn test_parse_live_records_drops_malformed_keeps_rest() {
        let text = r#"[
            {"name":"Good Corp","type":"Mainboard","status":"Open",
             "priceBand":"₹90","lotSize":150,"gmp":3,"subscription":"1.1x"},
            {"name":"Bad Corp","type":"Sideboard","status":"Open"},
            {"name":"Also Good","type":"SME","status":"Closed",
             "priceBand":"₹40","lotSize":3000,"gmp":0,"subscription":"0.8x"}
        ]"#;

        let records = parse_live_records(text, &[], 0).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Good Corp");
        assert_eq!(records[1].name, "Also Good");
    }

    #[test]
    fn test_parse_live_records_attaches_grounding_sources() {
        let text = r#"[{"name":"Acme","type":"Mainboard","status":"Open",
            "priceBand":"₹10","lotSize":1,"gmp":1,"subscription":"1x"}]"#;
        let sources = vec![GroundingSource {
            title: "Chittorgarh".to_string(),
            uri: "https://example.com/gmp".to_string(),
        }];

        let records = parse_live_records(text, &sources, 0).expect("parse");
        assert_eq!(records[0].grounding_sources.as_deref(), Some(&sources[..]));
    }

    #[test]
    fn test_parse_live_records_no_array_is_payload_error() {
        let result = parse_live_records("I could not find any IPO data.", &[], 0);
        assert!(matches!(result, Err(FeedError::Payload(_))));
    }

    #[test]
    fn test_candidate_text_concatenates_parts() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[{"},{"text":"}]"}]}}]}"#,
        )
        .expect("deserialize");
        assert_eq!(payload.candidate_text(), "[{}]");
    }

    #[test]
    fn test_grounding_sources_skip_non_web_chunks() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{
                "content":{"parts":[{"text":"[]"}]},
                "groundingMetadata":{"groundingChunks":[
                    {"web":{"title":"NSE","uri":"https://nse.example"}},
                    {}
                ]}
            }]}"#,
        )
        .expect("deserialize");

        let sources = payload.grounding_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "NSE");
    }

    #[test]
    fn test_classify_429_is_rate_limited() {
        let err = classify_http_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Resource has been exhausted"}}"#,
        );
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("Resource has been exhausted"));
    }

    #[test]
    fn test_classify_not_found_entity_is_auth_mismatch() {
        let err = classify_http_failure(
            StatusCode::NOT_FOUND,
            r#"{"error":{"message":"Requested entity was not found."}}"#,
        );
        assert!(matches!(err, FeedError::AuthMismatch(_)));
    }

    #[test]
    fn test_classify_other_status_is_generic() {
        let err = classify_http_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, FeedError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_with_retry_retries_rate_limited_then_succeeds() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
        };
        let calls = Cell::new(0u32);

        let result = with_retry(&policy, || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(FeedError::RateLimited("quota".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
        };
        let calls = Cell::new(0u32);

        let result: Result<(), _> = with_retry(&policy, || {
            calls.set(calls.get() + 1);
            async { Err(FeedError::RateLimited("quota".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(FeedError::RateLimited(_))));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_auth_mismatch() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
        };
        let calls = Cell::new(0u32);

        let result: Result<(), _> = with_retry(&policy, || {
            calls.set(calls.get() + 1);
            async { Err(FeedError::AuthMismatch("bad key".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(FeedError::AuthMismatch(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_default_retry_policy_matches_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.initial_delay, Duration::from_millis(2000));
    }
}
