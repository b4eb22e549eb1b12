//! Command-line front end for the Container Service Extension.
//!
//! Parses arguments, resolves the config file, runs the connectivity
//! validator and the install, uninstall and service commands, and reports
//! any failure once as a single line pointing at the log file.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod cli;
pub mod commands;
pub mod confirm;
pub mod console;
pub mod error;
pub mod logging;
pub mod service;
pub mod workflow;
