//! Subcommand handlers.
//!
//! Every handler returns `Result<(), CliError>`; nothing here prints errors.
//! Reporting happens once, in `main`, via [`crate::error::report_failure`].

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use cse_core::{Config, TemplateFilter, VersionInfo};
use cse_probe::{Validator, DEFAULT_PROBE_TIMEOUT};

use crate::cli::{resolve_config_path, Commands, CONFIG_ENV};
use crate::confirm::{Confirm, TerminalConfirm};
use crate::console::ConsoleObserver;
use crate::error::{CliError, FailureKind};
use crate::logging::LogHandle;
use crate::service;
use crate::workflow::{selected_templates, Plan, PlanReporter, Workflow};

/// Question asked before uninstalling.
pub const UNINSTALL_PROMPT: &str = "Are you sure you want to uninstall CSE?";

/// Where handler output goes.
pub struct Output<'a> {
    /// Probe lines, results and documents.
    pub out: &'a mut dyn Write,
    /// Warnings such as the insecure TLS notice.
    pub warn: &'a mut dyn Write,
    pub color: bool,
    /// Receives the config file's log level once the config is loaded.
    pub log: &'a LogHandle,
}

/// Which wording a failure of `command` is reported with.
#[must_use]
pub fn failure_kind(command: &Commands) -> FailureKind {
    match command {
        Commands::Check { .. } => FailureKind::InvalidConfiguration,
        _ => FailureKind::General,
    }
}

/// Run `command` with the terminal prompt and the plan-reporting workflow.
///
/// # Errors
/// Returns the handler's error unchanged.
pub async fn dispatch(command: Commands, json: bool, output: Output<'_>) -> Result<(), CliError> {
    let env = std::env::var_os(CONFIG_ENV);
    tracing::debug!(?command, "dispatching");
    match command {
        Commands::Version => version(json, output.out),
        Commands::Sample => sample(output.out),
        Commands::Check { config, template } => {
            let path = resolve_config_path(config.path, env);
            check(&path, &template.template, DEFAULT_PROBE_TIMEOUT, output).await
        }
        Commands::Install { config, template, no_capture } => {
            let path = resolve_config_path(config.path, env);
            install(&path, &template.template, no_capture, &PlanReporter, output).await
        }
        Commands::Uninstall { config, template, yes } => {
            let path = resolve_config_path(config.path, env);
            let mut confirm = TerminalConfirm;
            uninstall(
                &path,
                &template.template,
                yes,
                &mut confirm,
                &PlanReporter,
                output.out,
                output.log,
            )
        }
        Commands::Run { config, skip_check } => {
            let path = resolve_config_path(config.path, env);
            run(&path, skip_check, output).await
        }
    }
}

/// Print the sample configuration.
///
/// # Errors
/// Returns [`CliError::Io`] if stdout cannot be written.
pub fn sample(out: &mut dyn Write) -> Result<(), CliError> {
    out.write_all(cse_core::sample_config().as_bytes())?;
    Ok(())
}

/// Print the version line, or the version identity as JSON.
///
/// # Errors
/// Returns [`CliError::Io`] if stdout cannot be written.
pub fn version(json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let info = VersionInfo::new(env!("CARGO_PKG_VERSION"));
    if json {
        serde_json::to_writer_pretty(&mut *out, &info).map_err(std::io::Error::from)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{info}")?;
    }
    Ok(())
}

fn load(path: &Path, log: &LogHandle) -> Result<Config, CliError> {
    tracing::info!(path = %path.display(), "loading configuration");
    let config = Config::load(path)?;
    if log.apply_config_level(config.service.logging_level) {
        tracing::info!(level = ?config.service.logging_level, "applied configured log level");
    }
    Ok(config)
}

async fn validate(config: &Config, timeout: Duration, output: Output<'_>) -> Result<(), CliError> {
    let validator = Validator::from_config(config, timeout);
    let mut observer = ConsoleObserver::new(output.out, output.warn).colored(output.color);
    validator.validate(&mut observer).await?;
    Ok(())
}

/// Validate the configuration at `path` and the template selection.
///
/// # Errors
/// Returns the first config, probe or template error.
pub async fn check(
    path: &Path,
    filter: &TemplateFilter,
    timeout: Duration,
    output: Output<'_>,
) -> Result<(), CliError> {
    let config = load(path, output.log)?;
    let Output { out, warn, color, log } = output;
    validate(&config, timeout, Output { out: &mut *out, warn, color, log }).await?;
    let templates = selected_templates(&config, filter)?;
    tracing::info!(templates = ?templates, "configuration is valid");
    writeln!(out, "The configuration is valid.")?;
    Ok(())
}

/// Validate, then hand an install plan to `workflow`.
///
/// # Errors
/// Returns the first config, probe, template or workflow error.
pub async fn install(
    path: &Path,
    filter: &TemplateFilter,
    no_capture: bool,
    workflow: &dyn Workflow,
    output: Output<'_>,
) -> Result<(), CliError> {
    let config = load(path, output.log)?;
    let Output { out, warn, color, log } = output;
    validate(&config, DEFAULT_PROBE_TIMEOUT, Output { out: &mut *out, warn, color, log }).await?;
    let plan = Plan::install(&config, filter, !no_capture)?;
    tracing::info!(templates = ?plan.templates, capture = !no_capture, "installing");
    workflow.install(&plan, out).map_err(CliError::Workflow)
}

/// Load the config and build the plan, confirm unless `yes`, then hand the
/// plan to `workflow`.
///
/// A missing or invalid config fails before the user is asked anything.
///
/// # Errors
/// Returns the first config or template error, [`CliError::Aborted`] when
/// declined, otherwise the workflow error.
pub fn uninstall(
    path: &Path,
    filter: &TemplateFilter,
    yes: bool,
    confirm: &mut dyn Confirm,
    workflow: &dyn Workflow,
    out: &mut dyn Write,
    log: &LogHandle,
) -> Result<(), CliError> {
    let config = load(path, log)?;
    let plan = Plan::uninstall(&config, filter)?;
    if !yes && !confirm.confirm(UNINSTALL_PROMPT)? {
        tracing::info!("uninstall declined");
        return Err(CliError::Aborted);
    }
    tracing::info!(templates = ?plan.templates, "uninstalling");
    workflow.uninstall(&plan, out).map_err(CliError::Workflow)
}

/// Validate unless `skip_check`, then serve broker requests until Ctrl-C.
///
/// # Errors
/// Returns the first config, probe or broker error.
pub async fn run(path: &Path, skip_check: bool, output: Output<'_>) -> Result<(), CliError> {
    let config = load(path, output.log)?;
    if skip_check {
        tracing::info!("configuration check skipped");
    } else {
        validate(&config, DEFAULT_PROBE_TIMEOUT, output).await?;
    }
    service::run(&config, tokio::signal::ctrl_c()).await
}

/// Whether warnings on stderr should be coloured.
#[must_use]
pub fn stderr_color() -> bool {
    std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;

    use cse_core::ConfigError;

    use super::*;

    struct Scripted {
        answer: bool,
        asked: usize,
    }

    impl Confirm for Scripted {
        fn confirm(&mut self, prompt: &str) -> Result<bool, CliError> {
            assert_eq!(prompt, UNINSTALL_PROMPT);
            self.asked += 1;
            Ok(self.answer)
        }
    }

    #[derive(Default)]
    struct Recording {
        installs: Cell<usize>,
        uninstalls: Cell<usize>,
    }

    impl Workflow for Recording {
        fn install(&self, _plan: &Plan, _out: &mut dyn Write) -> std::io::Result<()> {
            self.installs.set(self.installs.get() + 1);
            Ok(())
        }

        fn uninstall(&self, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()> {
            self.uninstalls.set(self.uninstalls.get() + 1);
            writeln!(out, "{} steps", plan.steps.len())
        }
    }

    fn write_config(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        if let Err(e) = std::fs::write(&path, yaml) {
            panic!("write config: {e}");
        }
        path
    }

    fn detached() -> LogHandle {
        LogHandle::detached(PathBuf::from("cse.log"))
    }

    fn closed_port() -> u16 {
        let listener = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(l) => l,
            Err(e) => panic!("bind: {e}"),
        };
        match listener.local_addr() {
            Ok(a) => a.port(),
            Err(e) => panic!("addr: {e}"),
        }
    }

    #[test]
    fn sample_prints_template() {
        let mut out = Vec::new();
        assert!(sample(&mut out).is_ok());
        assert_eq!(String::from_utf8_lossy(&out), cse_core::sample_config());
    }

    #[test]
    fn version_prints_product_line() {
        let mut out = Vec::new();
        assert!(version(false, &mut out).is_ok());
        let text = String::from_utf8_lossy(&out);
        assert!(
            text.starts_with("cse, Container Service Extension for VMware vCloud Director, version "),
            "{text}"
        );
    }

    #[test]
    fn version_json_carries_identity_fields() {
        let mut out = Vec::new();
        assert!(version(true, &mut out).is_ok());
        let value: serde_json::Value = match serde_json::from_slice(&out) {
            Ok(v) => v,
            Err(e) => panic!("json: {e}"),
        };
        assert_eq!(value["product"], "cse");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert!(value["runtime"].is_string());
    }

    #[test]
    fn declined_uninstall_aborts_before_any_work() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = write_config(&dir, cse_core::sample_config());
        let mut confirm = Scripted { answer: false, asked: 0 };
        let workflow = Recording::default();
        let mut out = Vec::new();
        let result = uninstall(
            &path,
            &TemplateFilter::All,
            false,
            &mut confirm,
            &workflow,
            &mut out,
            &detached(),
        );
        assert!(matches!(result, Err(CliError::Aborted)), "{result:?}");
        assert_eq!(confirm.asked, 1);
        assert_eq!(workflow.uninstalls.get(), 0, "workflow must not run when declined");
    }

    #[test]
    fn uninstall_with_missing_config_fails_without_prompting() {
        let mut confirm = Scripted { answer: true, asked: 0 };
        let workflow = Recording::default();
        let result = uninstall(
            Path::new("does-not-exist.yaml"),
            &TemplateFilter::All,
            false,
            &mut confirm,
            &workflow,
            &mut Vec::<u8>::new(),
            &detached(),
        );
        assert!(matches!(result, Err(CliError::Config(ConfigError::Read { .. }))), "{result:?}");
        assert_eq!(confirm.asked, 0, "a missing config must fail before the prompt");
        assert_eq!(workflow.uninstalls.get(), 0);
    }

    #[test]
    fn uninstall_with_yes_skips_prompt() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = write_config(&dir, cse_core::sample_config());
        let mut confirm = Scripted { answer: false, asked: 0 };
        let workflow = Recording::default();
        let mut out = Vec::new();
        let result = uninstall(
            &path,
            &TemplateFilter::All,
            true,
            &mut confirm,
            &workflow,
            &mut out,
            &detached(),
        );
        assert!(result.is_ok(), "{result:?}");
        assert_eq!(confirm.asked, 0);
        assert_eq!(workflow.uninstalls.get(), 1);
    }

    #[test]
    fn confirmed_uninstall_runs_workflow() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = write_config(&dir, cse_core::sample_config());
        let mut confirm = Scripted { answer: true, asked: 0 };
        let workflow = Recording::default();
        let mut out = Vec::new();
        let result = uninstall(
            &path,
            &TemplateFilter::All,
            false,
            &mut confirm,
            &workflow,
            &mut out,
            &detached(),
        );
        assert!(result.is_ok(), "{result:?}");
        assert_eq!(workflow.uninstalls.get(), 1);
        assert!(String::from_utf8_lossy(&out).ends_with("steps\n"));
    }

    #[test]
    fn uninstall_unknown_template_is_rejected() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = write_config(&dir, cse_core::sample_config());
        let mut confirm = Scripted { answer: true, asked: 0 };
        let workflow = Recording::default();
        let filter = TemplateFilter::Named("photon-v1".to_owned());
        let result = uninstall(
            &path,
            &filter,
            true,
            &mut confirm,
            &workflow,
            &mut Vec::<u8>::new(),
            &detached(),
        );
        assert!(
            matches!(result, Err(CliError::Config(ConfigError::UnknownTemplate { .. }))),
            "{result:?}"
        );
        assert_eq!(workflow.uninstalls.get(), 0);
        assert_eq!(confirm.asked, 0, "an unknown template must fail before the prompt");
    }

    #[tokio::test]
    async fn check_missing_file_reports_read_error() {
        let mut out = Vec::new();
        let mut warn = Vec::new();
        let log = detached();
        let output = Output { out: &mut out, warn: &mut warn, color: false, log: &log };
        let result = check(
            Path::new("missing-config.yaml"),
            &TemplateFilter::All,
            DEFAULT_PROBE_TIMEOUT,
            output,
        )
        .await;
        assert!(matches!(result, Err(CliError::Config(ConfigError::Read { .. }))), "{result:?}");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn check_unreachable_broker_stops_after_amqp_line() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let port = closed_port();
        let yaml = cse_core::sample_config()
            .replace("host: amqp.vmware.com", "host: 127.0.0.1")
            .replace("port: 5672", &format!("port: {port}"));
        let path = write_config(&dir, &yaml);

        let mut out = Vec::new();
        let mut warn = Vec::new();
        let log = detached();
        let output = Output { out: &mut out, warn: &mut warn, color: false, log: &log };
        let result = check(&path, &TemplateFilter::All, Duration::from_secs(5), output).await;

        assert!(matches!(result, Err(CliError::Validation(_))), "{result:?}");
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text, format!("Connection to AMQP server (127.0.0.1:{port}): fail\n"));
        assert!(warn.is_empty(), "no vCD probe means no TLS notice");
    }

    #[test]
    fn only_check_uses_invalid_configuration_wording() {
        let check = Commands::Check {
            config: crate::cli::ConfigArg::default(),
            template: crate::cli::TemplateArg { template: TemplateFilter::All },
        };
        assert_eq!(failure_kind(&check), FailureKind::InvalidConfiguration);
        assert_eq!(failure_kind(&Commands::Sample), FailureKind::General);
    }
}
