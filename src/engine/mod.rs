//! Client side of the external multi-category safety analysis engine.
//!
//! The engine itself is a separate service; this module owns only the
//! wire contract and a typed HTTP client. No navigation or storage side
//! effects live here — callers decide how to react to failures.

pub mod client;
pub mod types;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine connection failed: {0}")]
    Connection(String),

    #[error("Engine request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx from the engine, with its `detail` message when the body
    /// carried one.
    #[error("Engine returned status {status}")]
    Engine { status: u16, detail: Option<String> },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

impl EngineError {
    /// The engine-reported failure detail, when present.
    pub fn detail(&self) -> Option<&str> {
        match self {
            EngineError::Engine { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
