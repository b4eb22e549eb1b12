//! Command-line surface.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cse_core::TemplateFilter;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CSE_CONFIG";

/// Config file used when neither flag nor environment variable is set.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

const AFTER_HELP: &str = "\
Examples:
    cse sample                      Generate sample config.
    cse sample > config.yaml        Save sample config.
    cse check                       Validate configuration.
    cse install                     Install CSE.
    cse install -t photon-v1        Install CSE, creating only the given template.
    cse install -t photon-v1 -n     Create the temporary vApp without capturing it.
    cse version                     Display version.

Environment variables:
    CSE_CONFIG    Config file to use when --config is not given.
                  Defaults to 'config.yaml' in the current directory.";

/// Container Service Extension for VMware vCloud Director.
#[derive(Parser, Debug)]
#[command(name = "cse", version, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Print structured output as JSON where supported.
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show CSE version
    Version,

    /// Generate sample CSE configuration
    Sample,

    /// Validate CSE configuration
    Check {
        #[command(flatten)]
        config: ConfigArg,

        #[command(flatten)]
        template: TemplateArg,
    },

    /// Install CSE on vCloud Director
    Install {
        #[command(flatten)]
        config: ConfigArg,

        #[command(flatten)]
        template: TemplateArg,

        /// Create the temporary vApp but do not capture it in the catalog
        #[arg(short = 'n', long)]
        no_capture: bool,
    },

    /// Uninstall CSE from vCloud Director
    Uninstall {
        #[command(flatten)]
        config: ConfigArg,

        #[command(flatten)]
        template: TemplateArg,

        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run CSE service
    Run {
        #[command(flatten)]
        config: ConfigArg,

        /// Skip configuration check
        #[arg(short = 's', long)]
        skip_check: bool,
    },
}

/// `-c/--config <config-file>`.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigArg {
    /// Config file to use
    #[arg(short = 'c', long = "config", value_name = "config-file")]
    pub path: Option<PathBuf>,
}

/// `-t/--template <template>`.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct TemplateArg {
    /// Template to operate on ('*' for all templates)
    #[arg(short = 't', long = "template", value_name = "template", default_value = "*")]
    pub template: TemplateFilter,
}

/// Resolve the config path: explicit flag, then environment, then default.
#[must_use]
pub fn resolve_config_path(flag: Option<PathBuf>, env: Option<OsString>) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
