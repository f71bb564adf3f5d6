//! Unified error types for urlfilter.
//!
//! Store-side failures are inconclusive: a stage that sees one hands the lookup
//! to its successor when it has one. Chain misconfiguration is only ever raised
//! while the chain is being built.

use tokio_rusqlite::rusqlite;

/// Unified error types for the filter chain and its stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backing store could not answer (network, I/O, driver failure).
    #[error("STORE_UNAVAILABLE: {store}: {reason}")]
    StoreUnavailable { store: String, reason: String },

    /// SQLite operation failed.
    #[error("STORE_UNAVAILABLE: sqlite: {0}")]
    Database(tokio_rusqlite::Error),

    /// Schema migration failed while opening a store.
    #[error("STORE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// Structural chain error: missing mandatory successor, unknown stage kind.
    #[error("CHAIN_MISCONFIGURED: {0}")]
    ChainMisconfigured(String),

    /// A catch-up load was aborted and will be retried on the next tick.
    #[error("LOAD_PAGE_FAILED: {store}: {reason}")]
    LoadPageFailed { store: String, reason: String },

    /// Invalid input at the lookup boundary (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether this error leaves a lookup without an answer.
    ///
    /// Stages treat these as "ask the next stage" rather than as a verdict.
    pub fn is_inconclusive(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable { .. }
                | Error::Database(_)
                | Error::MigrationFailed(_)
                | Error::LoadPageFailed { .. }
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
