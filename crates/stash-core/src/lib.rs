//! # Stash Core
//!
//! Core types and error definitions for Stash.
//! This crate provides the shared error taxonomy, typed identifiers,
//! the user domain entity, and logging initialisation used by every
//! other crate in the workspace.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use telemetry::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
