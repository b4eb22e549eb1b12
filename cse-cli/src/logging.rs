//! Log sink setup.
//!
//! Logging is initialised once at startup and never torn down. Console
//! output does not go through `tracing`; the log file only carries detail.
//! The filter sits behind a reload layer so the config file's
//! `service.logging_level` can replace it once the config is loaded.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// Log file written in the working directory.
pub const LOG_FILE: &str = "cse.log";

const DEFAULT_FILTER: &str = "info,lapin=warn,reqwest=warn,hyper=warn";

/// Handle to the initialised log sink.
#[derive(Debug, Clone)]
pub struct LogHandle {
    path: PathBuf,
    filter: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

impl LogHandle {
    /// A handle for a log path without installing a subscriber.
    #[must_use]
    pub fn detached(path: PathBuf) -> Self {
        Self { path, filter: None, from_env: false }
    }

    /// Where error detail is written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the default filter with the config file's numeric level.
    ///
    /// Returns whether the filter changed. Nothing changes when `RUST_LOG`
    /// chose the filter, when `level` is unset, or on a detached handle.
    pub fn apply_config_level(&self, level: Option<u8>) -> bool {
        let (Some(handle), Some(level), false) = (&self.filter, level, self.from_env) else {
            return false;
        };
        match handle.reload(EnvFilter::new(level_directive(level))) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, level, "cannot apply configured log level");
                false
            }
        }
    }
}

/// Filter directive for a numeric config log level.
#[must_use]
pub fn level_directive(level: u8) -> &'static str {
    match level {
        0..=9 => "trace,lapin=warn,reqwest=warn,hyper=warn",
        10..=19 => "debug,lapin=warn,reqwest=warn,hyper=warn",
        20..=29 => DEFAULT_FILTER,
        30..=39 => "warn",
        _ => "error",
    }
}

/// Install the global subscriber writing to `path`.
///
/// The filter comes from `RUST_LOG` when set.
///
/// # Errors
/// Returns an I/O error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init(path: impl Into<PathBuf>) -> std::io::Result<LogHandle> {
    let path = path.into();
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let (env_filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(DEFAULT_FILTER), false),
    };
    let (filter_layer, filter) = reload::Layer::new(env_filter);

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(LogHandle { path, filter: Some(filter), from_env })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_levels_map_to_directives() {
        assert!(level_directive(5).starts_with("trace,"));
        assert!(level_directive(10).starts_with("debug,"));
        assert_eq!(level_directive(20), DEFAULT_FILTER);
        assert_eq!(level_directive(30), "warn");
        assert_eq!(level_directive(40), "error");
        assert_eq!(level_directive(50), "error");
    }

    #[test]
    fn verbose_levels_keep_dependency_noise_down() {
        for level in [0, 5, 10, 15] {
            assert!(level_directive(level).contains("lapin=warn"), "{level}");
        }
    }

    #[test]
    fn every_directive_parses() {
        for level in [0, 10, 20, 30, 40] {
            assert!(EnvFilter::try_new(level_directive(level)).is_ok(), "{level}");
        }
    }

    #[test]
    fn detached_handle_ignores_config_level() {
        let log = LogHandle::detached(PathBuf::from(LOG_FILE));
        assert!(!log.apply_config_level(Some(10)));
        assert!(!log.apply_config_level(None));
    }
}
