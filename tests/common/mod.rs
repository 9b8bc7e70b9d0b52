//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the service binary against a scratch
//! database and calling its HTTP API.

pub mod server;

#[allow(unused_imports)]
pub use server::{TestServer, sqlite_url};
