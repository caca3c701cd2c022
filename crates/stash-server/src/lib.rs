//! # Stash Server Library
//!
//! Dependency injection wiring, the REST surface, and startup utilities
//! for the Stash demo server.

pub mod di;
pub mod rest;
pub mod startup;
