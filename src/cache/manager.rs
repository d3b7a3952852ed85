//! Cache manager for the IPO snapshot
//!
//! Owns the single source of truth for "the current set of IPOs": decides
//! when the persisted snapshot is still fresh, orchestrates the live fetch
//! with its fallback ladder (fresh cache → live feed → stale cache → seed
//! data), and replaces the snapshot wholesale on every successful fetch.
//! Callers always receive a renderable list; a fetch failure is a secondary
//! signal, carried as an error only when the UI needs to react to it.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::store::Store;
use crate::data::live::OFFLINE_INSIGHT;
use crate::data::{seed_ipos, FeedError, IpoRecord, LiveFeed};

/// Validity window of a persisted snapshot: 1 hour, in milliseconds
pub const CACHE_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Store key holding the serialized snapshot records
const CACHE_KEY: &str = "ipo_data_cache";

/// Store key holding the snapshot timestamp (epoch ms, as a string)
const TS_KEY: &str = "ipo_data_timestamp";

/// Store key prefix for per-record analyst insights
const INSIGHT_KEY_PREFIX: &str = "ipo_insight_";

/// Failures surfaced to the UI alongside recoverable data
///
/// Only raised when a degraded condition needs user-visible treatment;
/// both variants carry the stale records so the caller can render cards
/// while showing the warning.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The live feed is rate limited; `fallback` holds the last-known-good
    /// records, tagged not-live
    #[error("live data rate limited: {message}")]
    RateLimited {
        message: String,
        fallback: Vec<IpoRecord>,
    },

    /// The configured API key does not match the requested entity;
    /// `fallback` holds the last-known-good records, tagged not-live
    #[error("API key mismatch: {message}")]
    AuthMismatch {
        message: String,
        fallback: Vec<IpoRecord>,
    },
}

impl CacheError {
    /// Consumes the error, yielding the recoverable records.
    pub fn into_fallback(self) -> Vec<IpoRecord> {
        match self {
            CacheError::RateLimited { fallback, .. } => fallback,
            CacheError::AuthMismatch { fallback, .. } => fallback,
        }
    }
}

/// Applies one freshness classification to every record of a snapshot.
fn tag_is_live(mut records: Vec<IpoRecord>, is_live: bool) -> Vec<IpoRecord> {
    for record in &mut records {
        record.is_live = is_live;
    }
    records
}

/// Answers "what is the current IPO list" with minimal live-feed traffic
///
/// Overlapping calls are allowed and run the algorithm independently; the
/// snapshot write is a wholesale replacement, so the last call to complete
/// wins. That is acceptable for idempotent read-only market data.
#[derive(Clone)]
pub struct CacheManager {
    store: Store,
    feed: Arc<dyn LiveFeed>,
}

impl CacheManager {
    /// Creates a manager over the given store and live feed.
    pub fn new(store: Store, feed: Arc<dyn LiveFeed>) -> Self {
        Self { store, feed }
    }

    /// Returns the current IPO list.
    ///
    /// With `force_refresh` false and a snapshot younger than
    /// [`CACHE_WINDOW_MS`], the persisted records are returned without any
    /// network access. Otherwise the live feed is consulted and the ladder
    /// applies:
    /// - non-empty success: persisted as the new snapshot, returned live
    /// - empty success or failure with a prior snapshot: the prior records,
    ///   tagged not-live - as an `Err` carrying them when the failure was a
    ///   rate limit or key mismatch, as a plain `Ok` otherwise
    /// - failure with no history: the built-in seed dataset, tagged not-live
    pub async fn get_ipos(&self, force_refresh: bool) -> Result<Vec<IpoRecord>, CacheError> {
        let now = Utc::now().timestamp_millis();

        if !force_refresh {
            if let (Some(records), Some(ts)) = (self.read_snapshot(), self.last_updated_ms()) {
                let age = now - ts;
                if age < CACHE_WINDOW_MS {
                    debug!(age_mins = age / 60_000, "serving fresh cache");
                    return Ok(records);
                }
            }
        }

        match self.feed.fetch_live().await {
            Ok(records) if !records.is_empty() => {
                let records = tag_is_live(records, true);
                self.write_snapshot(&records, now);
                Ok(records)
            }
            // An empty live answer is not trusted; fall through the ladder
            Ok(_) => self.degrade(FeedError::Payload("no live data available".to_string())),
            Err(err) => self.degrade(err),
        }
    }

    /// Timestamp of the persisted snapshot, epoch milliseconds.
    ///
    /// The durable store is the single authoritative "last updated" value;
    /// the freshness clock re-reads it through here after every refresh so
    /// it never drifts from a fallback rewrite.
    pub fn last_updated_ms(&self) -> Option<i64> {
        self.store.get(TS_KEY)?.trim().parse().ok()
    }

    /// Returns the analyst insight for a record, serving the stored text
    /// when one exists. Insights live outside the snapshot window and are
    /// never invalidated. Failures degrade to a fixed notice.
    pub async fn get_insight(&self, record: &IpoRecord) -> String {
        let key = Self::insight_key(&record.name);
        if let Some(cached) = self.store.get(&key) {
            return cached;
        }

        match self.feed.fetch_insight(record).await {
            Ok(text) => {
                // The offline notice is transient; only real insights persist
                if text != OFFLINE_INSIGHT {
                    if let Err(err) = self.store.set(&key, &text) {
                        warn!(%err, "failed to persist insight");
                    }
                }
                text
            }
            Err(err) => {
                warn!(%err, name = %record.name, "insight fetch failed");
                "Unable to fetch AI insights at this time.".to_string()
            }
        }
    }

    fn insight_key(name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}{}", INSIGHT_KEY_PREFIX, slug)
    }

    /// Serves the best remaining data after a live-fetch failure.
    fn degrade(&self, err: FeedError) -> Result<Vec<IpoRecord>, CacheError> {
        if let Some(stale) = self.read_snapshot() {
            warn!(%err, "live fetch failed, serving stale cache");
            let stale = tag_is_live(stale, false);
            return match err {
                FeedError::RateLimited(message) => Err(CacheError::RateLimited {
                    message,
                    fallback: stale,
                }),
                FeedError::AuthMismatch(message) => Err(CacheError::AuthMismatch {
                    message,
                    fallback: stale,
                }),
                _ => Ok(stale),
            };
        }

        warn!(%err, "live fetch failed with no history, serving seed data");
        Ok(tag_is_live(seed_ipos(), false))
    }

    fn read_snapshot(&self) -> Option<Vec<IpoRecord>> {
        let raw = self.store.get(CACHE_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Persists the snapshot wholesale. A write failure downgrades the call
    /// to uncached operation rather than failing it.
    fn write_snapshot(&self, records: &[IpoRecord], now_ms: i64) {
        match serde_json::to_string(records) {
            Ok(json) => {
                if let Err(err) = self.store.set(CACHE_KEY, &json) {
                    warn!(%err, "failed to persist snapshot");
                    return;
                }
                if let Err(err) = self.store.set(TS_KEY, &now_ms.to_string()) {
                    warn!(%err, "failed to persist snapshot timestamp");
                }
            }
            Err(err) => warn!(%err, "failed to serialize snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{IpoStatus, IpoType};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Live feed double that replays a script of results and counts calls
    struct ScriptedFeed {
        live_calls: AtomicUsize,
        insight_calls: AtomicUsize,
        results: Mutex<VecDeque<Result<Vec<IpoRecord>, FeedError>>>,
        insight: String,
    }

    impl ScriptedFeed {
        fn new(results: Vec<Result<Vec<IpoRecord>, FeedError>>) -> Arc<Self> {
            Arc::new(Self {
                live_calls: AtomicUsize::new(0),
                insight_calls: AtomicUsize::new(0),
                results: Mutex::new(results.into()),
                insight: "Scripted analyst view.".to_string(),
            })
        }

        fn with_insight(results: Vec<Result<Vec<IpoRecord>, FeedError>>, insight: &str) -> Arc<Self> {
            Arc::new(Self {
                live_calls: AtomicUsize::new(0),
                insight_calls: AtomicUsize::new(0),
                results: Mutex::new(results.into()),
                insight: insight.to_string(),
            })
        }

        fn live_calls(&self) -> usize {
            self.live_calls.load(Ordering::SeqCst)
        }

        fn insight_calls(&self) -> usize {
            self.insight_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LiveFeed for ScriptedFeed {
        async fn fetch_live(&self) -> Result<Vec<IpoRecord>, FeedError> {
            self.live_calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn fetch_insight(&self, _record: &IpoRecord) -> Result<String, FeedError> {
            self.insight_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.insight.clone())
        }
    }

    fn record(id: &str, name: &str) -> IpoRecord {
        IpoRecord {
            id: id.to_string(),
            name: name.to_string(),
            sector: None,
            kind: IpoType::Mainboard,
            status: IpoStatus::Open,
            price_band: "₹100 - ₹110".to_string(),
            lot_size: 130,
            gmp: 12,
            subscription: "2.0x".to_string(),
            issue_price: None,
            listing_price: None,
            current_price: None,
            returns: None,
            grounding_sources: None,
            is_live: true,
        }
    }

    fn manager_with(
        results: Vec<Result<Vec<IpoRecord>, FeedError>>,
    ) -> (CacheManager, Arc<ScriptedFeed>, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = Store::with_dir(temp_dir.path().to_path_buf());
        let feed = ScriptedFeed::new(results);
        let manager = CacheManager::new(store, feed.clone());
        (manager, feed, temp_dir)
    }

    fn seed_snapshot(manager: &CacheManager, records: &[IpoRecord], age_ms: i64) {
        let ts = Utc::now().timestamp_millis() - age_ms;
        manager.write_snapshot(records, ts);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_short_circuits_without_fetch() {
        let (manager, feed, _dir) = manager_with(vec![]);
        let cached = vec![record("a", "Cached Corp")];
        seed_snapshot(&manager, &cached, 10 * 60 * 1000);

        let result = manager.get_ipos(false).await.expect("cached data");

        assert_eq!(result, cached);
        assert_eq!(feed.live_calls(), 0, "fresh cache must not hit the feed");
    }

    #[tokio::test]
    async fn test_expired_snapshot_fetches_exactly_once() {
        let live = vec![record("b", "Live Corp")];
        let (manager, feed, _dir) = manager_with(vec![Ok(live.clone())]);
        seed_snapshot(&manager, &[record("a", "Old Corp")], 61 * 60 * 1000);

        let result = manager.get_ipos(false).await.expect("live data");

        assert_eq!(feed.live_calls(), 1);
        assert_eq!(result[0].name, "Live Corp");
        assert!(result.iter().all(|r| r.is_live));
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_fresh_cache() {
        let (manager, feed, _dir) = manager_with(vec![Ok(vec![record("b", "Live Corp")])]);
        seed_snapshot(&manager, &[record("a", "Cached Corp")], 1000);

        let result = manager.get_ipos(true).await.expect("live data");

        assert_eq!(feed.live_calls(), 1, "force must always hit the feed");
        assert_eq!(result[0].name, "Live Corp");
    }

    #[tokio::test]
    async fn test_generic_failure_with_history_returns_stale_ok() {
        let (manager, _feed, _dir) = manager_with(vec![Err(FeedError::Status {
            status: 500,
            message: "server error".to_string(),
        })]);
        seed_snapshot(&manager, &[record("a", "Old Corp")], 2 * 60 * 60 * 1000);

        let result = manager.get_ipos(false).await.expect("stale fallback is Ok");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Old Corp");
        assert!(result.iter().all(|r| !r.is_live), "stale data is tagged not-live");
    }

    #[tokio::test]
    async fn test_failure_with_no_history_returns_seed() {
        let (manager, feed, _dir) = manager_with(vec![Err(FeedError::Payload(
            "bad payload".to_string(),
        ))]);

        let result = manager.get_ipos(false).await.expect("seed fallback is Ok");

        assert_eq!(feed.live_calls(), 1);
        assert_eq!(result, tag_is_live(seed_ipos(), false));
        assert!(result.iter().all(|r| !r.is_live));
    }

    #[tokio::test]
    async fn test_rate_limited_with_history_attaches_fallback_to_error() {
        let (manager, _feed, _dir) = manager_with(vec![Err(FeedError::RateLimited(
            "quota exhausted".to_string(),
        ))]);
        let prior = vec![record("a", "Old Corp"), record("b", "Older Corp")];
        seed_snapshot(&manager, &prior, 2 * 60 * 60 * 1000);

        let err = manager.get_ipos(false).await.expect_err("rate limit is soft-fail");

        match err {
            CacheError::RateLimited { fallback, .. } => {
                assert_eq!(fallback, tag_is_live(prior, false));
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_with_no_history_returns_seed_ok() {
        let (manager, _feed, _dir) = manager_with(vec![Err(FeedError::RateLimited(
            "quota exhausted".to_string(),
        ))]);

        let result = manager.get_ipos(false).await.expect("no history degrades to seed");

        assert!(result.iter().all(|r| !r.is_live));
    }

    #[tokio::test]
    async fn test_auth_mismatch_with_history_attaches_fallback_to_error() {
        let (manager, _feed, _dir) = manager_with(vec![Err(FeedError::AuthMismatch(
            "Requested entity was not found".to_string(),
        ))]);
        seed_snapshot(&manager, &[record("a", "Old Corp")], 2 * 60 * 60 * 1000);

        let err = manager.get_ipos(false).await.expect_err("auth mismatch surfaces");

        match err {
            CacheError::AuthMismatch { fallback, .. } => {
                assert_eq!(fallback.len(), 1);
                assert!(!fallback[0].is_live);
            }
            other => panic!("expected AuthMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_success_is_treated_as_failure_and_never_persisted() {
        let (manager, feed, _dir) = manager_with(vec![Ok(Vec::new())]);
        let prior = vec![record("a", "Old Corp")];
        seed_snapshot(&manager, &prior, 2 * 60 * 60 * 1000);

        let result = manager.get_ipos(false).await.expect("stale fallback");

        assert_eq!(feed.live_calls(), 1);
        assert_eq!(result[0].name, "Old Corp");
        assert!(!result[0].is_live);
        // The empty answer must not have replaced the snapshot
        let persisted = manager.read_snapshot().expect("snapshot still present");
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].name, "Old Corp");
    }

    #[tokio::test]
    async fn test_empty_success_with_no_history_returns_seed_without_persisting() {
        let (manager, _feed, _dir) = manager_with(vec![Ok(Vec::new())]);

        let result = manager.get_ipos(false).await.expect("seed fallback");

        assert!(!result.is_empty());
        assert!(manager.read_snapshot().is_none(), "empty answer never persisted");
    }

    #[tokio::test]
    async fn test_success_persists_snapshot_and_timestamp() {
        let live = vec![record("b", "Live Corp")];
        let (manager, _feed, _dir) = manager_with(vec![Ok(live)]);
        let before = Utc::now().timestamp_millis();

        manager.get_ipos(true).await.expect("live data");

        let persisted = manager.read_snapshot().expect("snapshot written");
        assert_eq!(persisted[0].name, "Live Corp");
        assert!(persisted[0].is_live);
        let ts = manager.last_updated_ms().expect("timestamp written");
        assert!(ts >= before);
    }

    #[tokio::test]
    async fn test_consecutive_fetches_replace_snapshot_wholesale() {
        let first = vec![record("a", "First Corp"), record("b", "Second Corp")];
        let second = vec![record("c", "Third Corp")];
        let (manager, _feed, _dir) = manager_with(vec![Ok(first), Ok(second)]);

        manager.get_ipos(true).await.expect("first fetch");
        manager.get_ipos(true).await.expect("second fetch");

        let persisted = manager.read_snapshot().expect("snapshot");
        assert_eq!(persisted.len(), 1, "no merging of old and new records");
        assert_eq!(persisted[0].name, "Third Corp");
    }

    #[tokio::test]
    async fn test_fallback_keeps_last_persisted_timestamp() {
        let (manager, _feed, _dir) = manager_with(vec![Err(FeedError::Payload(
            "bad payload".to_string(),
        ))]);
        let ts_before = Utc::now().timestamp_millis() - 2 * 60 * 60 * 1000;
        manager.write_snapshot(&[record("a", "Old Corp")], ts_before);

        manager.get_ipos(false).await.expect("stale fallback");

        assert_eq!(manager.last_updated_ms(), Some(ts_before));
    }

    #[tokio::test]
    async fn test_insight_is_cached_after_first_fetch() {
        let (manager, feed, _dir) = manager_with(vec![]);
        let rec = record("a", "Acme Ltd");

        let first = manager.get_insight(&rec).await;
        let second = manager.get_insight(&rec).await;

        assert_eq!(first, "Scripted analyst view.");
        assert_eq!(second, first);
        assert_eq!(feed.insight_calls(), 1, "second read must come from the store");
    }

    #[tokio::test]
    async fn test_offline_insight_notice_is_not_persisted() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = Store::with_dir(temp_dir.path().to_path_buf());
        let feed = ScriptedFeed::with_insight(vec![], OFFLINE_INSIGHT);
        let manager = CacheManager::new(store, feed.clone());
        let rec = record("a", "Acme Ltd");

        manager.get_insight(&rec).await;
        manager.get_insight(&rec).await;

        assert_eq!(feed.insight_calls(), 2, "offline notice must not be cached");
    }

    #[test]
    fn test_insight_key_slugs_record_names() {
        assert_eq!(
            CacheManager::insight_key("Gujarat Kidney & Super Speciality"),
            "ipo_insight_gujarat_kidney___super_speciality"
        );
    }

    #[test]
    fn test_into_fallback_yields_records() {
        let err = CacheError::RateLimited {
            message: "quota".to_string(),
            fallback: vec![record("a", "Old Corp")],
        };
        assert_eq!(err.into_fallback().len(), 1);
    }
}
