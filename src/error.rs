//! Error types for the CS-2000A capture utility.
//!
//! A single `thiserror` enum covers the whole crate: the channel failing to
//! open, I/O failures mid-exchange, protocol violations (a missing `OK00`
//! token or an unparseable field), the bounded completion poll running out,
//! and the spectral length check at persistence time.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, Cs2000Error>;

/// Errors raised while driving the CS-2000A or persisting its data.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Cs2000Error {
    #[error("failed to open serial port '{port}': {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("measurement did not complete after {polls} status polls")]
    CompletionTimeout { polls: u32 },

    #[error("expected {expected} spectral samples, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}
