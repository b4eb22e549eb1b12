//! Core types for the Container Service Extension CLI.
//!
//! Defines the typed configuration document, the sample template, template
//! selection and the version identity shared by the probe and CLI crates.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod sample;
pub mod template;
pub mod version;

pub use config::{
    AmqpConfig, BrokerConfig, Config, Endpoint, ServiceConfig, VcdConfig, VcsConfig, AMQP_VHOST,
};
pub use error::ConfigError;
pub use sample::sample_config;
pub use template::{TemplateFilter, ALL_TEMPLATES};
pub use version::VersionInfo;
