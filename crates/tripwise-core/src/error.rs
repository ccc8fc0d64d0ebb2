// ── Core error types ──
//
// Store setters never fail: lookup misses and malformed input degrade to
// defaults. These errors cover the few operations that do return a Result:
// storage I/O, the simulated hotel backend, and loaders built on top of it.

use thiserror::Error;

use crate::model::SelectionId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Selection not found: {id}")]
    SelectionNotFound { id: SelectionId },

    #[error("Selection {id} is a {kind} selection, not a hotel")]
    NotAHotelSelection { id: SelectionId, kind: String },

    #[error("Selection {id} is a {kind} selection, not a flight")]
    NotAFlightSelection { id: SelectionId, kind: String },

    // ── Simulated backend ────────────────────────────────────────────
    #[error("Hotel not found: {id}")]
    HotelNotFound { id: String },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Storage error for key '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}
