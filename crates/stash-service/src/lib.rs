//! # Stash Service
//!
//! User directory service layer for Stash.
//! [`UserServiceImpl`] talks to the origin repository; [`CachingUserService`]
//! decorates any [`UserService`] with cache-aside reads and evicting writes.

pub mod cache_keys;
pub mod cached_user_service;
pub mod dto;
pub mod r#impl;
pub mod repository;
pub mod user_service;

pub use cached_user_service::CachingUserService;
pub use dto::*;
pub use r#impl::UserServiceImpl;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use user_service::UserService;
