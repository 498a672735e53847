//! Drug Search Session — debounced, cancel-on-keystroke incremental
//! lookup against the formulary.
//!
//! Every keystroke cancels the pending debounce timer; only 350ms of
//! quiescence issues a request. In-flight HTTP is never aborted —
//! instead each request carries a monotonically increasing token, and a
//! response is discarded unless its token is still the latest issued.
//! Without the token, a slow older response could overwrite newer,
//! correct results.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::AbortHandle;

use crate::config;
use crate::models::DrugCandidate;
use crate::records::RecordsError;

/// Formulary lookup seam. `RecordsClient` is the HTTP implementation.
pub trait FormularyLookup: Send + Sync {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<DrugCandidate>, RecordsError>> + Send;
}

struct ArmedTimer {
    id: u64,
    handle: AbortHandle,
}

/// Single-slot cancellable timer.
///
/// Arming always cancels the prior timer first, so at most one pending
/// timer exists per owner. A fired task clears its own slot entry
/// before doing any I/O, which is why a later `cancel` never aborts an
/// in-flight request — only the quiescence wait is cancellable.
pub struct DebounceTimer {
    slot: Mutex<Option<ArmedTimer>>,
    seq: AtomicU64,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            seq: AtomicU64::new(0),
        }
    }

    pub fn cancel(&self) {
        if let Some(timer) = self.slot.lock().expect("timer slot poisoned").take() {
            timer.handle.abort();
        }
    }

    /// Cancel any pending timer, then arm a new one that runs `fire`
    /// after `delay`. The fire closure receives the timer id so it can
    /// `disarm` its own slot entry when it wakes.
    pub fn arm<F, Fut>(&self, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        // Create the sleep here so the deadline is fixed at arm time,
        // not at the spawned task's first poll.
        let sleep = tokio::time::sleep(delay);
        let task = tokio::spawn(async move {
            sleep.await;
            fire(id).await;
        });
        *self.slot.lock().expect("timer slot poisoned") = Some(ArmedTimer {
            id,
            handle: task.abort_handle(),
        });
        id
    }

    /// Clear the slot if it still belongs to timer `id`.
    pub fn disarm(&self, id: u64) {
        let mut slot = self.slot.lock().expect("timer slot poisoned");
        if slot.as_ref().map(|timer| timer.id) == Some(id) {
            *slot = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().expect("timer slot poisoned").is_some()
    }
}

impl Default for DebounceTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable session state, mutated on every keystroke.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<DrugCandidate>,
    pub in_flight: bool,
    pub selected: Option<DrugCandidate>,
    pub selection_error: Option<String>,
}

struct SessionInner<F> {
    lookup: F,
    debounce: Duration,
    timer: DebounceTimer,
    latest_token: AtomicU64,
    state: Mutex<SearchState>,
}

impl<F: FormularyLookup> SessionInner<F> {
    fn issue_token(&self) -> u64 {
        self.latest_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark every outstanding request stale without issuing a new one.
    fn invalidate(&self) {
        self.latest_token.fetch_add(1, Ordering::SeqCst);
    }

    async fn run_search(&self, query: String) {
        let token = self.issue_token();
        self.state.lock().expect("search state poisoned").in_flight = true;
        tracing::debug!(%query, token, "formulary search issued");

        let outcome = self.lookup.search(&query).await;

        if token != self.latest_token.load(Ordering::SeqCst) {
            tracing::debug!(%query, token, "stale formulary response discarded");
            return;
        }

        // Lookup failure is not surfaced as an error: the result list
        // just stays empty.
        let results = match outcome {
            Ok(results) => results,
            Err(error) => {
                tracing::warn!(%query, %error, "formulary search failed");
                Vec::new()
            }
        };

        let mut state = self.state.lock().expect("search state poisoned");
        state.results = results;
        state.in_flight = false;
    }
}

/// One search session per prescribing screen. Clones share the same
/// state.
pub struct DrugSearchSession<F> {
    inner: Arc<SessionInner<F>>,
}

impl<F> Clone for DrugSearchSession<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: FormularyLookup + 'static> DrugSearchSession<F> {
    pub fn new(lookup: F) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                lookup,
                debounce: config::search_debounce(),
                timer: DebounceTimer::new(),
                latest_token: AtomicU64::new(0),
                state: Mutex::new(SearchState::default()),
            }),
        }
    }

    /// Handle one keystroke. Must be called from within a tokio
    /// runtime; results arrive via `state()` once the debounce fires.
    pub fn input(&self, raw: &str) {
        self.inner.timer.cancel();

        let query = raw.trim().to_string();
        {
            let mut state = self.inner.state.lock().expect("search state poisoned");
            state.query = raw.to_string();
            state.selected = None;
        }

        if query.chars().count() < config::MIN_SEARCH_QUERY_CHARS {
            self.inner.invalidate();
            let mut state = self.inner.state.lock().expect("search state poisoned");
            state.results.clear();
            state.in_flight = false;
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.inner.timer.arm(self.inner.debounce, move |timer_id| async move {
            inner.timer.disarm(timer_id);
            inner.run_search(query).await;
        });
    }

    /// Pick a candidate: stops the session, fills the query with the
    /// canonical label, clears results and any "no drug selected"
    /// validation error.
    pub fn select(&self, candidate: &DrugCandidate) {
        self.inner.timer.cancel();
        self.inner.invalidate();

        let mut state = self.inner.state.lock().expect("search state poisoned");
        state.query = candidate.label();
        state.results.clear();
        state.in_flight = false;
        state.selected = Some(candidate.clone());
        state.selection_error = None;
    }

    /// Record a validation error ("no drug selected"); cleared by the
    /// next `select`.
    pub fn set_selection_error(&self, message: &str) {
        self.inner
            .state
            .lock()
            .expect("search state poisoned")
            .selection_error = Some(message.to_string());
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.lock().expect("search state poisoned").clone()
    }

    pub fn selected(&self) -> Option<DrugCandidate> {
        self.inner
            .state
            .lock()
            .expect("search state poisoned")
            .selected
            .clone()
    }
}
