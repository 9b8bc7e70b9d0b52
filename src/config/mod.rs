//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML loading
//! - [`defaults`]: serde default value functions

mod defaults;
mod types;

pub use types::{Config, DatabaseConfig};

/// Environment variable carrying the store connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
