//! Error types for the scoring engine.

use thiserror::Error;

/// Engine error type.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The per-wallet transaction slice was empty. Callers surface this as
    /// "profile not found", never as a zero score.
    #[error("Empty dataset: no transactions to extract metrics from")]
    EmptyDataset,

    /// The transaction feed could not be read or parsed.
    #[error("Failed to read transaction feed: {0}")]
    Feed(#[from] csv::Error),

    /// A row carried a timestamp that no supported format could parse.
    /// Unlike malformed amounts (coerced to 0), there is no sane default
    /// instant, so the whole load fails and names the row.
    #[error("Row {row}: unparseable timestamp \"{value}\"")]
    BadTimestamp {
        /// 1-based row number in the feed, counting the header as row 1.
        row: usize,
        /// The offending timestamp text.
        value: String,
    },

    /// The feed could not be opened.
    #[error("Failed to open transaction feed {path}: {source}")]
    Io {
        /// Feed path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;
