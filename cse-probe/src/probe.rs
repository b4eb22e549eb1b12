//! Probe abstraction trait.
//!
//! Lets the validator run real endpoint checks or test doubles without
//! changing the validation sequence.

use async_trait::async_trait;

use crate::{ProbeError, ProbeTarget};

/// A single connectivity check against one external system.
///
/// Implementations must be `Send + Sync` so the validator can hold them as
/// trait objects across await points.
///
/// # Cancel Safety
/// Implementations release any connection they opened before returning.
/// Dropping the future mid-probe drops the underlying connection.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The system this probe connects to.
    fn target(&self) -> &ProbeTarget;

    /// Whether this probe skips TLS certificate verification.
    fn insecure(&self) -> bool {
        false
    }

    /// Connect, check status or authenticate, and release the connection.
    ///
    /// # Errors
    /// Returns a [`ProbeError`] describing why the system is not usable.
    async fn probe(&self) -> Result<(), ProbeError>;
}
