//! Connectivity probes for the Container Service Extension.
//!
//! Checks that the AMQP broker, vCloud Director and vCenter Server named in
//! a configuration are reachable and accept the configured credentials.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod amqp;
pub mod error;
mod http;
pub mod probe;
pub mod target;
pub mod validator;
pub mod vcd;
pub mod vcs;

pub use amqp::AmqpProbe;
pub use error::{ProbeError, ValidationError};
pub use probe::Probe;
pub use target::{ProbeReport, ProbeTarget};
pub use validator::{ProbeObserver, Validator, DEFAULT_PROBE_TIMEOUT};
pub use vcd::VcdProbe;
pub use vcs::VcsProbe;
