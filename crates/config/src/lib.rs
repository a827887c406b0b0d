//! Configuration management for the coverage export tooling.
//!
//! This crate provides types and loaders for the REST API connection and
//! export job tracking settings, read from builder values, environment
//! variables and `.env` files.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{Config, ConnectionConfig, ExportConfig};
