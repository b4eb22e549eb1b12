//! Configuration validator running the three probes in order.
//!
//! The sequence is fixed: broker, then vCloud Director, then vCenter Server.
//! Validation is fail-fast: the first failing probe is reported as `fail`
//! and the remaining probes are not attempted.

use std::time::Duration;

use cse_core::Config;

use crate::{
    AmqpProbe, Probe, ProbeError, ProbeReport, ProbeTarget, ValidationError, VcdProbe, VcsProbe,
};

/// Default upper bound on a single probe: 30 seconds.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives validation progress as it happens.
pub trait ProbeObserver {
    /// Called once per validation, before the first probe that skips TLS
    /// certificate verification.
    fn insecure_tls(&mut self, target: &ProbeTarget);

    /// Called after every attempted probe.
    fn report(&mut self, report: &ProbeReport<'_>);
}

/// Runs the configured probes in order.
pub struct Validator {
    probes: Vec<Box<dyn Probe>>,
    timeout: Duration,
}

impl Validator {
    /// Create a validator from the three probes, in check order.
    #[must_use]
    pub fn new(
        amqp: impl Probe + 'static,
        vcd: impl Probe + 'static,
        vcs: impl Probe + 'static,
    ) -> Self {
        Self {
            probes: vec![Box::new(amqp), Box::new(vcd), Box::new(vcs)],
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Create a validator probing the endpoints named in `config`.
    #[must_use]
    pub fn from_config(config: &Config, timeout: Duration) -> Self {
        Self::new(
            AmqpProbe::new(&config.amqp),
            VcdProbe::new(&config.vcd, timeout),
            VcsProbe::new(&config.vcs, timeout),
        )
        .with_timeout(timeout)
    }

    /// Override the per-probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every probe in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming the first probe that failed.
    pub async fn validate(&self, observer: &mut dyn ProbeObserver) -> Result<(), ValidationError> {
        let mut warned_insecure = false;

        for probe in &self.probes {
            let target = probe.target();

            if probe.insecure() && !warned_insecure {
                observer.insecure_tls(target);
                warned_insecure = true;
            }

            tracing::info!(system = %target, "probing");
            let result = match tokio::time::timeout(self.timeout, probe.probe()).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(self.timeout)),
            };

            observer.report(&target.report(result.is_ok()));

            if let Err(source) = result {
                tracing::error!(system = %target, error = %source, "probe failed");
                return Err(ValidationError::new(target.clone(), source));
            }
        }
        Ok(())
    }
}
