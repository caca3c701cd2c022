//! # Stash Config
//!
//! Configuration management for Stash.
//! Supports layered configuration from files and environment variables,
//! validation of the cache settings surface, and runtime refresh.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
