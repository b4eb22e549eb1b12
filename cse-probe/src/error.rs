//! Error types for the probe crate.

use std::time::Duration;

use crate::target::ProbeTarget;

/// Errors a single probe can fail with.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The remote endpoint could not be reached or the transport failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint answered but rejected the credentials.
    #[error("authentication rejected (HTTP {status})")]
    AuthRejected { status: u16 },

    /// The endpoint answered with a status the probe does not accept.
    ///
    /// `body` is a single-line excerpt; the full body is logged.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The broker accepted the connection but it is not open.
    #[error("connection is not open")]
    NotOpen,

    /// The probe did not complete in time.
    #[error("no answer within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

/// A probe failure during configuration validation.
///
/// Validation is fail-fast, so this names the first probe that failed.
#[derive(Debug, thiserror::Error)]
#[error("connection to {target} failed: {source}")]
#[non_exhaustive]
pub struct ValidationError {
    /// The system whose probe failed.
    pub target: ProbeTarget,
    /// Why it failed.
    #[source]
    pub source: ProbeError,
}

impl ValidationError {
    #[must_use]
    pub fn new(target: ProbeTarget, source: ProbeError) -> Self {
        Self { target, source }
    }
}
