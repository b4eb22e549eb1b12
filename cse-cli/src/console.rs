//! Console rendering of validation progress.

use std::io::Write;

use cse_probe::{ProbeObserver, ProbeReport, ProbeTarget};
use owo_colors::OwoColorize;

const INSECURE_NOTICE: &str = "InsecureRequestWarning: Unverified HTTPS request is being made. \
Adding certificate verification is strongly advised.";

/// Prints probe lines to `out` and TLS warnings to `warn`.
pub struct ConsoleObserver<'a> {
    out: &'a mut dyn Write,
    warn: &'a mut dyn Write,
    color: bool,
}

impl<'a> ConsoleObserver<'a> {
    #[must_use]
    pub fn new(out: &'a mut dyn Write, warn: &'a mut dyn Write) -> Self {
        Self { out, warn, color: false }
    }

    /// Colour the TLS warning.
    #[must_use]
    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl ProbeObserver for ConsoleObserver<'_> {
    fn insecure_tls(&mut self, target: &ProbeTarget) {
        tracing::warn!(system = %target, "TLS certificate verification disabled");
        let written = if self.color {
            writeln!(self.warn, "{}", INSECURE_NOTICE.yellow())
        } else {
            writeln!(self.warn, "{INSECURE_NOTICE}")
        };
        if let Err(e) = written {
            tracing::warn!(error = %e, "cannot write TLS warning");
        }
    }

    fn report(&mut self, report: &ProbeReport<'_>) {
        tracing::info!(system = %report.target, outcome = report.outcome(), "probe finished");
        if let Err(e) = writeln!(self.out, "{report}") {
            tracing::warn!(error = %e, "cannot write probe report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lines_go_to_out_and_warnings_to_warn() {
        let mut out = Vec::new();
        let mut warn = Vec::new();
        let target = ProbeTarget::Vcd {
            host: "vcd.local".to_owned(),
            port: 443,
            username: "admin".to_owned(),
        };
        {
            let mut observer = ConsoleObserver::new(&mut out, &mut warn);
            observer.insecure_tls(&target);
            observer.report(&target.report(true));
        }
        assert_eq!(
            String::from_utf8_lossy(&out),
            "Connection to vCloud Director as system administrator (vcd.local:443): success\n"
        );
        let warning = String::from_utf8_lossy(&warn);
        assert!(warning.starts_with("InsecureRequestWarning"), "{warning}");
        assert!(!warning.contains('\u{1b}'), "uncoloured output must not carry escapes");
    }

    #[test]
    fn colored_warning_is_yellow() {
        let mut out = Vec::new();
        let mut warn = Vec::new();
        let target = ProbeTarget::Vcs {
            host: "vc.local".to_owned(),
            port: 443,
            username: "administrator@vsphere.local".to_owned(),
        };
        ConsoleObserver::new(&mut out, &mut warn).colored(true).insecure_tls(&target);
        let warning = String::from_utf8_lossy(&warn);
        assert!(warning.starts_with("\u{1b}[33mInsecureRequestWarning"), "{warning:?}");
        assert!(out.is_empty());
    }
}
