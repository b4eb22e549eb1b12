//! Error types for the CLI crate and their single presentation point.

use std::error::Error as _;
use std::io::Write;

use crate::logging::LogHandle;

/// Errors a command handler can return.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CliError {
    /// The config file could not be loaded or is malformed.
    #[error(transparent)]
    Config(#[from] cse_core::ConfigError),

    /// A connectivity probe failed during validation.
    #[error(transparent)]
    Validation(#[from] cse_probe::ValidationError),

    /// The broker connection used by `run` failed.
    #[error("broker: {0}")]
    Probe(#[from] cse_probe::ProbeError),

    /// An AMQP operation failed after the connection was established.
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    /// A `run` listener's consumer closed while the service was running.
    #[error("listener {consumer_tag} stopped consuming")]
    ListenerStopped { consumer_tag: String },

    /// A `run` listener task panicked or was cancelled.
    #[error("listener task failed: {0}")]
    Listener(#[from] tokio::task::JoinError),

    /// The user declined a confirmation prompt.
    #[error("aborted by user")]
    Aborted,

    /// An install or uninstall plan could not be carried out.
    #[error("workflow failed: {0}")]
    Workflow(#[source] std::io::Error),

    /// The confirmation prompt could not be shown.
    #[error("cannot prompt for confirmation: {0}")]
    Prompt(String),

    /// Writing to the console or reading a signal failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which failure wording the presentation layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `cse check`: the configuration itself is reported invalid.
    InvalidConfiguration,
    /// Every other command.
    General,
}

impl CliError {
    /// The one line shown to the user for this error.
    #[must_use]
    pub fn user_message(&self, kind: FailureKind, log: &LogHandle) -> String {
        if matches!(self, Self::Aborted) {
            return "Aborted!".to_owned();
        }
        let lead = match kind {
            FailureKind::InvalidConfiguration => "The configuration is invalid",
            FailureKind::General => "An error has occurred",
        };
        let detail = single_line(&self.to_string());
        format!("{lead}, {detail}. See '{}' for details", log.path().display())
    }
}

/// Join the non-blank lines of `text` with spaces.
fn single_line(text: &str) -> String {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Render `err` and all of its sources, outermost first.
#[must_use]
pub fn error_chain(err: &CliError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        // Wrappers that already print their source would repeat it.
        let text = cause.to_string();
        if !chain.ends_with(&text) {
            chain.push_str(": ");
            chain.push_str(&text);
        }
        source = cause.source();
    }
    chain
}

/// Report a handler failure: full detail to the log, one line to `out`.
pub fn report_failure(err: &CliError, kind: FailureKind, log: &LogHandle, out: &mut dyn Write) {
    tracing::error!(error = %error_chain(err), debug = ?err, "command failed");
    if let Err(e) = writeln!(out, "{}", err.user_message(kind, log)) {
        tracing::warn!(error = %e, "cannot write failure message");
    }
}
