//! Domain entities served through the cache.

mod user;

pub use user::*;
