//! Typed configuration document.
//!
//! The YAML file carries three required sections (`amqp`, `vcd`, `vcs`) and
//! two optional ones (`service`, `broker`). Shape errors are reported by
//! `serde_yaml` with the offending field; value errors by [`Config::validate`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Virtual host used for every broker connection.
pub const AMQP_VHOST: &str = "/";

/// The full configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Config {
    /// Message broker the service consumes provisioning requests from.
    pub amqp: AmqpConfig,

    /// vCloud Director the extension is registered with.
    pub vcd: VcdConfig,

    /// vCenter Server backing the vCloud Director installation.
    pub vcs: VcsConfig,

    /// Runtime settings for `cse run`.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Template and catalog settings used by `install` / `uninstall`.
    #[serde(default)]
    pub broker: Option<BrokerConfig>,
}

/// `amqp` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct AmqpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,

    /// Exchange provisioning requests are published to.
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Routing key the service binds its queue with.
    #[serde(default = "default_routing_key")]
    pub routing_key: String,
}

/// `vcd` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VcdConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,

    /// vCloud API version sent in the `Accept` header, e.g. `"6.0"`.
    pub api_version: String,

    /// Verify the server's TLS certificate.
    pub verify: bool,

    /// Log request/response traffic with the vCD API.
    #[serde(default)]
    pub log: bool,
}

/// `vcs` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VcsConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,

    /// Verify the server's TLS certificate.
    #[serde(default = "default_true")]
    pub verify: bool,
}

/// `service` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ServiceConfig {
    /// Number of concurrent queue consumers started by `cse run`.
    #[serde(default = "default_listeners")]
    pub listeners: u16,

    /// Numeric log level for `cse.log` (10 debug, 20 info, 30 warning,
    /// 40 error; lower is more verbose). `RUST_LOG` takes precedence.
    #[serde(default)]
    pub logging_level: Option<u8>,

    /// Accepted for compatibility with existing config files and ignored;
    /// the log line layout is fixed.
    #[serde(default)]
    pub logging_format: Option<String>,

    /// Private key installed into cluster nodes.
    #[serde(default)]
    pub key_filename: Option<String>,

    /// Public key installed into cluster nodes.
    #[serde(default)]
    pub key_filename_pub: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listeners: default_listeners(),
            logging_level: None,
            logging_format: None,
            key_filename: None,
            key_filename_pub: None,
        }
    }
}

/// `broker` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct BrokerConfig {
    #[serde(rename = "type", default = "default_broker_type")]
    pub kind: String,

    /// Catalog templates are uploaded to.
    pub catalog: String,

    pub master_template: String,
    pub node_template: String,

    /// Root password set on template VMs.
    pub password: String,
}

impl BrokerConfig {
    /// Distinct template names, master first.
    #[must_use]
    pub fn templates(&self) -> Vec<&str> {
        let mut names = vec![self.master_template.as_str()];
        if self.node_template != self.master_template {
            names.push(self.node_template.as_str());
        }
        names
    }
}

fn default_exchange() -> String {
    "vcdext".to_owned()
}

fn default_routing_key() -> String {
    "cse".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_listeners() -> u16 {
    2
}

fn default_broker_type() -> String {
    "default".to_owned()
}

impl Config {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the document is not YAML or a required
    /// field is missing or mistyped, and [`ConfigError::InvalidValue`] if a
    /// field fails [`Config::validate`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the config file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// the errors of [`Config::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check value constraints that the YAML shape cannot express.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_host("amqp.host", &self.amqp.host)?;
        require_port("amqp.port", self.amqp.port)?;
        require_host("vcd.host", &self.vcd.host)?;
        require_port("vcd.port", self.vcd.port)?;
        require_host("vcs.host", &self.vcs.host)?;
        require_port("vcs.port", self.vcs.port)?;

        if self.vcd.api_version.trim().is_empty() {
            return Err(invalid("vcd.api_version", "must not be empty"));
        }
        if self.service.listeners == 0 {
            return Err(invalid("service.listeners", "must be at least 1"));
        }
        if let Some(broker) = &self.broker {
            if broker.catalog.trim().is_empty() {
                return Err(invalid("broker.catalog", "must not be empty"));
            }
        }
        Ok(())
    }
}

fn require_host(field: &str, host: &str) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if host.contains(['/', ' ']) {
        return Err(invalid(field, "must be a bare host name or address"));
    }
    Ok(())
}

fn require_port(field: &str, port: u16) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(invalid(field, "must be in 1..=65535"));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// A `host:port` pair as printed in probe reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl AmqpConfig {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint<'_> {
        Endpoint { host: &self.host, port: self.port }
    }
}

impl VcdConfig {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint<'_> {
        Endpoint { host: &self.host, port: self.port }
    }
}

impl VcsConfig {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint<'_> {
        Endpoint { host: &self.host, port: self.port }
    }
}
