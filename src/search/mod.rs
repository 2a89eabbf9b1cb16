//! Track search with debounce, cancellation, fallback transport and caching
//!
//! - `provider`: request building / payload decoding per service
//! - `transport`: direct and proxied HTTP access
//! - `error`: failure taxonomy and how each failure is surfaced
//!
//! A `SearchController` allows one search in flight. Each call to
//! [`SearchController::search`] supersedes every earlier call: the earlier
//! call resolves to `SearchError::Cancelled` and never touches the cache.

mod error;
mod provider;
mod transport;

use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};

pub use error::{PayloadError, SearchError, TransportError};
pub use provider::{Deezer, SearchProvider, Spotify, DEEZER_SEARCH_URL, SPOTIFY_SEARCH_URL};
pub use transport::{unwrap_envelope, DirectTransport, ProviderRequest, ProxyTransport, Transport};

use crate::model::{CacheKey, Notice, SearchCache, SearchMode, SearchTrigger, Track};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Live searches need at least this many characters after trimming
pub const MIN_LIVE_QUERY_CHARS: usize = 3;

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub debounce: Duration,
    pub timeout: Duration,
    pub suggestion_limit: usize,
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            timeout: DEFAULT_SEARCH_TIMEOUT,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl SearchConfig {
    fn limit(&self, mode: SearchMode) -> usize {
        match mode {
            SearchMode::Suggestions => self.suggestion_limit,
            SearchMode::Full => self.result_limit,
        }
    }
}

/// A search that ran to completion
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was empty after trimming; nothing was searched
    Blank,
    Found { tracks: Vec<Track>, cached: bool },
    NoResults,
}

impl SearchOutcome {
    /// "No results" is only worth saying when the user asked explicitly.
    pub fn notice(&self, trigger: SearchTrigger) -> Option<Notice> {
        match (self, trigger) {
            (SearchOutcome::NoResults, SearchTrigger::Explicit) => {
                Some(Notice::info("No results found. Try a different search term."))
            }
            _ => None,
        }
    }

    /// Short description for logs
    pub fn summary(&self) -> String {
        match self {
            SearchOutcome::Blank => "blank query".to_string(),
            SearchOutcome::Found { tracks, cached: true } => format!("{} tracks (cached)", tracks.len()),
            SearchOutcome::Found { tracks, cached: false } => format!("{} tracks", tracks.len()),
            SearchOutcome::NoResults => "no results".to_string(),
        }
    }
}

/// A claim on the in-flight slot, taken before the search runs.
///
/// Taking the ticket is what supersedes older searches, so callers that hand
/// the search to another task take it first to keep call order.
pub struct SearchTicket {
    generation: u64,
    cancelled: oneshot::Receiver<()>,
}

struct InFlight {
    generation: u64,
    cancel: Option<oneshot::Sender<()>>,
}

pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
    cache: Mutex<SearchCache>,
    in_flight: StdMutex<InFlight>,
    config: SearchConfig,
}

impl SearchController {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        primary: Arc<dyn Transport>,
        fallback: Option<Arc<dyn Transport>>,
        config: SearchConfig,
    ) -> Self {
        Self {
            provider,
            primary,
            fallback,
            cache: Mutex::new(SearchCache::new()),
            in_flight: StdMutex::new(InFlight {
                generation: 0,
                cancel: None,
            }),
            config,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Run a search. Live searches are debounced and use the suggestion mode;
    /// explicit searches fire immediately for the full result list.
    pub async fn search(
        &self,
        query: &str,
        trigger: SearchTrigger,
    ) -> Result<SearchOutcome, SearchError> {
        let ticket = self.begin();
        self.run(ticket, query, trigger).await
    }

    /// Supersede every earlier search and claim the in-flight slot.
    pub fn begin(&self) -> SearchTicket {
        let (generation, cancelled) = self.supersede();
        SearchTicket { generation, cancelled }
    }

    /// Run a search under a ticket from [`SearchController::begin`].
    pub async fn run(
        &self,
        ticket: SearchTicket,
        query: &str,
        trigger: SearchTrigger,
    ) -> Result<SearchOutcome, SearchError> {
        let SearchTicket { generation, mut cancelled } = ticket;
        let mode = trigger.mode();

        let query = query.trim();
        if query.is_empty() {
            self.finish(generation);
            return Ok(SearchOutcome::Blank);
        }

        if trigger == SearchTrigger::Live && !self.config.debounce.is_zero() {
            tokio::select! {
                _ = &mut cancelled => return Err(SearchError::Cancelled { timed_out: false }),
                _ = tokio::time::sleep(self.config.debounce) => {}
            }
        }

        let key = CacheKey::new(query, mode);
        let cached = self.cache.lock().await.get(&key).map(<[Track]>::to_vec);
        if let Some(tracks) = cached {
            if !self.finish(generation) {
                return Err(SearchError::Cancelled { timed_out: false });
            }
            tracing::debug!(query, ?mode, count = tracks.len(), "Search cache hit");
            return Ok(SearchOutcome::Found {
                tracks,
                cached: true,
            });
        }

        let limit = self.config.limit(mode);
        tracing::debug!(query, ?mode, limit, provider = self.provider.name(), "Search started");

        let attempt = tokio::time::timeout(self.config.timeout, self.fetch(query, limit));
        let result = tokio::select! {
            _ = &mut cancelled => {
                tracing::debug!(query, "Search superseded");
                return Err(SearchError::Cancelled { timed_out: false });
            }
            result = attempt => result,
        };

        // A newer search may have started between the response and here
        if !self.finish(generation) {
            return Err(SearchError::Cancelled { timed_out: false });
        }

        let tracks = match result {
            Err(_) => {
                tracing::warn!(query, timeout_ms = self.config.timeout.as_millis() as u64, "Search timed out");
                return Err(SearchError::Cancelled { timed_out: true });
            }
            Ok(Err(e)) => {
                tracing::error!(query, error = %e, "Search failed");
                return Err(e);
            }
            Ok(Ok(tracks)) => tracks,
        };

        if tracks.is_empty() {
            tracing::info!(query, ?mode, "Search returned no results");
            return Ok(SearchOutcome::NoResults);
        }

        tracing::info!(query, ?mode, count = tracks.len(), "Search succeeded");
        self.cache.lock().await.put(key, tracks.clone());
        Ok(SearchOutcome::Found {
            tracks,
            cached: false,
        })
    }

    /// Abandon whatever search is in flight.
    pub fn cancel(&self) {
        let (generation, _) = self.supersede();
        self.finish(generation);
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Primary transport first; on any failure other than a timeout, the
    /// fallback gets one try.
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError> {
        let request = self
            .provider
            .request(query, limit)
            .map_err(SearchError::Transport)?;

        let primary_error = match self.primary.fetch(&request).await {
            Ok(body) => match self.provider.decode(body) {
                Ok(tracks) => return Ok(tracks),
                Err(e) => SearchError::Payload(e),
            },
            Err(e) => SearchError::Transport(e),
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_error);
        };

        tracing::warn!(
            primary = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_error,
            "Primary search transport failed, trying fallback"
        );

        let body = fallback
            .fetch(&request)
            .await
            .map_err(SearchError::Transport)?;
        Ok(self.provider.decode(body)?)
    }

    /// Start a new generation, cancelling the previous one.
    fn supersede(&self) -> (u64, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let mut in_flight = self.in_flight();
        if let Some(previous) = in_flight.cancel.replace(tx) {
            let _ = previous.send(());
        }
        in_flight.generation += 1;
        (in_flight.generation, rx)
    }

    /// Release the in-flight slot. Returns false if a newer search owns it.
    fn finish(&self, generation: u64) -> bool {
        let mut in_flight = self.in_flight();
        if in_flight.generation != generation {
            return false;
        }
        in_flight.cancel = None;
        true
    }

    fn in_flight(&self) -> MutexGuard<'_, InFlight> {
        // Never held across an await
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Reply {
        Body(Value),
        Fail(TransportError),
    }

    struct FakeTransport {
        name: &'static str,
        reply: Reply,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn new(name: &'static str, reply: Reply) -> Arc<Self> {
            Self::slow(name, reply, Duration::from_millis(50))
        }

        fn slow(name: &'static str, reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _request: &ProviderRequest) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Fail(err) => Err(err.clone()),
            }
        }
    }

    fn deezer_body(ids: &[u64]) -> Value {
        let data: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "title": format!("Song {id}"),
                    "duration": 30,
                    "preview": format!("https://cdn.test/{id}.mp3"),
                    "artist": { "name": "Artist" },
                    "album": { "title": "Album" }
                })
            })
            .collect();
        json!({ "data": data })
    }

    fn controller(
        primary: Arc<FakeTransport>,
        fallback: Option<Arc<FakeTransport>>,
    ) -> SearchController {
        SearchController::new(
            Arc::new(Deezer),
            primary,
            fallback.map(|f| f as Arc<dyn Transport>),
            SearchConfig::default(),
        )
    }

    fn ids(outcome: &SearchOutcome) -> Vec<String> {
        match outcome {
            SearchOutcome::Found { tracks, .. } => {
                tracks.iter().map(|t| t.id.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_does_no_network() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[1])));
        let search = controller(primary.clone(), None);

        let outcome = search.search("   ", SearchTrigger::Explicit).await;
        assert_eq!(outcome, Ok(SearchOutcome::Blank));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn found_results_are_cached() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[1, 2])));
        let search = controller(primary.clone(), None);

        let first = search.search(" daft punk ", SearchTrigger::Explicit).await.unwrap();
        assert_eq!(ids(&first), ["1", "2"]);
        assert!(matches!(first, SearchOutcome::Found { cached: false, .. }));

        let second = search.search("daft punk", SearchTrigger::Explicit).await.unwrap();
        assert!(matches!(second, SearchOutcome::Found { cached: true, .. }));
        assert_eq!(ids(&second), ["1", "2"]);
        assert_eq!(primary.calls(), 1);
        assert_eq!(search.cached_entries().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn modes_are_cached_separately() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[1])));
        let search = controller(primary.clone(), None);

        search.search("muse", SearchTrigger::Explicit).await.unwrap();
        search.search("muse", SearchTrigger::Live).await.unwrap();
        assert_eq!(primary.calls(), 2);
        assert_eq!(search.cached_entries().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_search_supersedes_first() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[1])));
        let search = controller(primary.clone(), None);

        let (first, second) = tokio::join!(
            search.search("test", SearchTrigger::Explicit),
            search.search("test", SearchTrigger::Explicit),
        );

        assert_eq!(first, Err(SearchError::Cancelled { timed_out: false }));
        assert_eq!(ids(&second.unwrap()), ["1"]);
        assert_eq!(search.cached_entries().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_supersedes_during_debounce() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[4])));
        let search = controller(primary.clone(), None);

        let (first, second) = tokio::join!(
            search.search("abc", SearchTrigger::Live),
            search.search("abcd", SearchTrigger::Live),
        );

        assert_eq!(first, Err(SearchError::Cancelled { timed_out: false }));
        assert!(second.is_ok());
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn live_search_waits_for_quiet_period() {
        let primary = FakeTransport::slow("primary", Reply::Body(deezer_body(&[1])), Duration::ZERO);
        let search = controller(primary.clone(), None);

        let started = tokio::time::Instant::now();
        search.search("abc", SearchTrigger::Live).await.unwrap();
        assert!(started.elapsed() >= DEFAULT_DEBOUNCE);

        let started = tokio::time::Instant::now();
        search.search("xyz", SearchTrigger::Explicit).await.unwrap();
        assert!(started.elapsed() < DEFAULT_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_is_not_an_error_and_not_cached() {
        let primary = FakeTransport::new("primary", Reply::Body(json!({ "data": [] })));
        let search = controller(primary.clone(), None);

        let explicit = search.search("test", SearchTrigger::Explicit).await.unwrap();
        assert_eq!(explicit, SearchOutcome::NoResults);
        assert!(explicit.notice(SearchTrigger::Explicit).is_some());

        let live = search.search("test", SearchTrigger::Live).await.unwrap();
        assert_eq!(live, SearchOutcome::NoResults);
        assert!(live.notice(SearchTrigger::Live).is_none());
        assert_eq!(search.cached_entries().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_falls_back() {
        let primary = FakeTransport::new(
            "primary",
            Reply::Fail(TransportError::Network("connection refused".into())),
        );
        let fallback = FakeTransport::new("proxy", Reply::Body(deezer_body(&[9])));
        let search = controller(primary.clone(), Some(fallback.clone()));

        let outcome = search.search("test", SearchTrigger::Explicit).await.unwrap();
        assert_eq!(ids(&outcome), ["9"]);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn error_shaped_payload_falls_back() {
        let primary = FakeTransport::new(
            "primary",
            Reply::Body(json!({ "error": { "message": "Quota limit exceeded" } })),
        );
        let fallback = FakeTransport::new("proxy", Reply::Body(deezer_body(&[5])));
        let search = controller(primary, Some(fallback.clone()));

        let outcome = search.search("test", SearchTrigger::Explicit).await.unwrap();
        assert_eq!(ids(&outcome), ["5"]);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn both_transports_failing_is_a_transport_failure() {
        let primary = FakeTransport::new("primary", Reply::Fail(TransportError::Status(500)));
        let fallback = FakeTransport::new("proxy", Reply::Fail(TransportError::Status(502)));
        let search = controller(primary.clone(), Some(fallback.clone()));

        let err = search.search("test", SearchTrigger::Explicit).await.unwrap_err();
        assert_eq!(err, SearchError::Transport(TransportError::Status(502)));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert!(err.notice(SearchTrigger::Explicit).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_error_body_is_a_payload_error() {
        let primary = FakeTransport::new("primary", Reply::Fail(TransportError::Status(403)));
        let fallback = FakeTransport::new(
            "proxy",
            Reply::Body(json!({ "error": { "message": "Invalid query" } })),
        );
        let search = controller(primary, Some(fallback));

        let err = search.search("test", SearchTrigger::Explicit).await.unwrap_err();
        assert_eq!(err, SearchError::Payload(PayloadError("Invalid query".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn without_fallback_primary_error_is_reported() {
        let primary = FakeTransport::new("primary", Reply::Fail(TransportError::Status(500)));
        let search = controller(primary, None);

        let err = search.search("test", SearchTrigger::Explicit).await.unwrap_err();
        assert_eq!(err, SearchError::Transport(TransportError::Status(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_a_cancellation() {
        let primary = FakeTransport::slow(
            "primary",
            Reply::Body(deezer_body(&[1])),
            Duration::from_secs(30),
        );
        let fallback = FakeTransport::new("proxy", Reply::Body(deezer_body(&[2])));
        let search = controller(primary, Some(fallback.clone()));

        let err = search.search("test", SearchTrigger::Explicit).await.unwrap_err();
        assert_eq!(err, SearchError::Cancelled { timed_out: true });
        assert_eq!(fallback.calls(), 0);
        assert!(err.notice(SearchTrigger::Explicit).is_some());
        assert!(err.notice(SearchTrigger::Live).is_none());
        assert_eq!(search.cached_entries().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_abandons_in_flight_search() {
        let primary = FakeTransport::new("primary", Reply::Body(deezer_body(&[1])));
        let search = controller(primary, None);

        let (result, ()) = tokio::join!(search.search("test", SearchTrigger::Explicit), async { search.cancel() });
        assert_eq!(result, Err(SearchError::Cancelled { timed_out: false }));
        assert_eq!(search.cached_entries().await, 0);
    }
}
