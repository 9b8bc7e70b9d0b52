//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

pub fn default_metrics_port() -> u16 {
    9090
}

// =============================================================================
// Database Pool Defaults
// =============================================================================

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_acquire_timeout_secs() -> u64 {
    5
}

pub fn default_idle_timeout_secs() -> u64 {
    60
}
