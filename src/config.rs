use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "rxgate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request timeout applied to every engine and records call.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Quiescence window before a formulary search request is issued.
pub const SEARCH_DEBOUNCE_MS: u64 = 350;

/// Queries shorter than this (after trimming) never hit the network.
pub const MIN_SEARCH_QUERY_CHARS: usize = 2;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "rxgate=info"
}

pub fn search_debounce() -> Duration {
    Duration::from_millis(SEARCH_DEBOUNCE_MS)
}

/// Base URLs for the two upstream services the crate talks to.
///
/// `engine_base_url` points at the analysis engine mount (the app proxies
/// it under `/agent`); `records_base_url` points at the clinic app API
/// that serves lab snapshots and the formulary search.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub engine_base_url: String,
    pub records_base_url: String,
}

impl Endpoints {
    /// Read endpoints from `RXGATE_ENGINE_URL` / `RXGATE_RECORDS_URL`,
    /// falling back to the local development defaults.
    pub fn from_env() -> Self {
        Self {
            engine_base_url: std::env::var("RXGATE_ENGINE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            records_base_url: std::env::var("RXGATE_RECORDS_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
        }
    }
}
