//! Entry point for the `cse` binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cse_cli::cli::Cli;
use cse_cli::commands::{self, Output};
use cse_cli::error::report_failure;
use cse_cli::logging::{self, LogHandle, LOG_FILE};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("cannot print help: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    let log = match logging::init(LOG_FILE) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("warning: logging to {LOG_FILE} disabled: {e}");
            LogHandle::detached(PathBuf::from(LOG_FILE))
        }
    };

    let kind = commands::failure_kind(&command);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let output = Output {
        out: &mut stdout,
        warn: &mut stderr,
        color: commands::stderr_color(),
        log: &log,
    };

    match commands::dispatch(command, cli.json, output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, kind, &log, &mut stdout);
            ExitCode::FAILURE
        }
    }
}
