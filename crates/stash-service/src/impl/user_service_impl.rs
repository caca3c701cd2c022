//! User service implementation over the origin repository.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::repository::UserRepository;
use crate::user_service::UserService;
use async_trait::async_trait;
use shaku::Component;
use stash_core::{StashError, StashResult, User, UserId, ValidateExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Uncached user service component.
///
/// Every call reaches the repository; wrap it in
/// [`CachingUserService`](crate::CachingUserService) for cache-aside reads.
#[derive(Component)]
#[shaku(interface = UserService)]
pub struct UserServiceImpl {
    #[shaku(inject)]
    user_repository: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    async fn load(&self, id: UserId) -> StashResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StashError::not_found("User", id))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(&self, id: UserId) -> StashResult<UserResponse> {
        debug!("Getting user: {}", id);
        Ok(UserResponse::from(self.load(id).await?))
    }

    async fn get_user_by_username(&self, username: &str) -> StashResult<UserResponse> {
        debug!("Getting user by username: {}", username);

        if username.trim().is_empty() {
            return Err(StashError::validation("Username must not be blank"));
        }

        let user = self
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| StashError::not_found("User", username))?;

        Ok(UserResponse::from(user))
    }

    async fn username_exists(&self, username: &str) -> StashResult<bool> {
        self.user_repository.exists_by_username(username).await
    }

    async fn create_user(&self, mut request: CreateUserRequest) -> StashResult<UserResponse> {
        request.username = request.username.trim().to_string();
        debug!("Creating user: {}", request.username);

        request.validate_request()?;

        if self.user_repository.exists_by_username(&request.username).await? {
            return Err(StashError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let id = self.user_repository.next_id().await?;
        let user = User::new(id, request.username, request.name, request.email);
        let saved_user = self.user_repository.save(&user).await?;

        info!("User created: {}", saved_user.id);
        Ok(UserResponse::from(saved_user))
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StashResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let mut user = self.load(id).await?;
        user.update_profile(request.name, request.email);
        let updated_user = self.user_repository.update(&user).await?;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated_user))
    }

    async fn delete_user(&self, id: UserId) -> StashResult<UserResponse> {
        debug!("Deleting user: {}", id);

        let user = self.load(id).await?;
        if !self.user_repository.delete(id).await? {
            return Err(StashError::not_found("User", id));
        }

        info!("User deleted: {}", id);
        Ok(UserResponse::from(user))
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}
