//! User service trait definition.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use async_trait::async_trait;
use stash_core::{Interface, StashResult, UserId};

/// User service trait.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> StashResult<UserResponse>;

    /// Gets a user by username.
    async fn get_user_by_username(&self, username: &str) -> StashResult<UserResponse>;

    /// Checks if a username exists.
    async fn username_exists(&self, username: &str) -> StashResult<bool>;

    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> StashResult<UserResponse>;

    /// Updates a user's profile.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StashResult<UserResponse>;

    /// Deletes a user, returning the removed record.
    async fn delete_user(&self, id: UserId) -> StashResult<UserResponse>;
}
