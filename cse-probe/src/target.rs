//! Probe targets and the report lines printed for them.

use std::fmt;

use cse_core::Endpoint;

/// One of the three external systems `cse check` connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProbeTarget {
    /// The AMQP message broker.
    Amqp { host: String, port: u16 },
    /// vCloud Director, logged into as system administrator.
    Vcd { host: String, port: u16, username: String },
    /// vCenter Server.
    Vcs { host: String, port: u16, username: String },
}

impl ProbeTarget {
    /// Host name of the target.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Amqp { host, .. } | Self::Vcd { host, .. } | Self::Vcs { host, .. } => host,
        }
    }

    /// Port of the target.
    #[must_use]
    pub fn port(&self) -> u16 {
        match self {
            Self::Amqp { port, .. } | Self::Vcd { port, .. } | Self::Vcs { port, .. } => *port,
        }
    }

    /// `host:port` of the target.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint<'_> {
        Endpoint { host: self.host(), port: self.port() }
    }

    /// Build the report line for an outcome.
    #[must_use]
    pub fn report(&self, success: bool) -> ProbeReport<'_> {
        ProbeReport { target: self, success }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = self.endpoint();
        match self {
            Self::Amqp { .. } => write!(f, "AMQP server ({endpoint})"),
            Self::Vcd { .. } => write!(f, "vCloud Director ({endpoint})"),
            Self::Vcs { .. } => write!(f, "vCenter Server ({endpoint})"),
        }
    }
}

/// The console line reporting a single probe outcome.
#[derive(Debug, Clone, Copy)]
pub struct ProbeReport<'a> {
    pub target: &'a ProbeTarget,
    pub success: bool,
}

impl ProbeReport<'_> {
    /// `"success"` or `"fail"`.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "fail"
        }
    }
}

impl fmt::Display for ProbeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome();
        let endpoint = self.target.endpoint();
        match self.target {
            ProbeTarget::Amqp { .. } => {
                write!(f, "Connection to AMQP server ({endpoint}): {outcome}")
            }
            ProbeTarget::Vcd { .. } => write!(
                f,
                "Connection to vCloud Director as system administrator ({endpoint}): {outcome}"
            ),
            ProbeTarget::Vcs { username, .. } => write!(
                f,
                "Connection to vCenter Server as {username} ({endpoint}): {outcome}"
            ),
        }
    }
}
