use std::path::PathBuf;

/// Errors produced by the `cse-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or does not match the expected shape.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field parsed but holds a value the CLI cannot use.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// A template filter named a template the broker section does not define.
    #[error("template '{name}' is not defined in the broker section")]
    UnknownTemplate { name: String },
}
