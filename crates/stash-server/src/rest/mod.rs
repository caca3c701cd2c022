//! REST API layer.
//!
//! Exposes the cached user directory and the cache counters over HTTP.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
