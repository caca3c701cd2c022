//! Result type aliases for Stash.

use crate::StashError;

/// A specialized `Result` type for Stash operations.
pub type StashResult<T> = Result<T, StashError>;
