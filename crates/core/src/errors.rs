use thiserror::Error;

/// Unified error type for the entire trade-ledger-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Trade input ─────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot sell {requested} {symbol} — you only hold {held}")]
    InsufficientQuantity {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Quotes ──────────────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("No quote provider available for {0}")]
    NoProvider(String),

    #[error("Quote unavailable for {symbol}: {message}")]
    QuoteUnavailable {
        symbol: String,
        message: String,
    },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
