//! Origin data access for users.

use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use stash_core::{normalize_username, Interface, StashError, StashResult, User, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// User repository trait.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Allocates the next user ID.
    async fn next_id(&self) -> StashResult<UserId>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> StashResult<Option<User>>;

    /// Finds a user by username, ignoring case.
    async fn find_by_username(&self, username: &str) -> StashResult<Option<User>>;

    /// Checks if a username exists, ignoring case.
    async fn exists_by_username(&self, username: &str) -> StashResult<bool>;

    /// Saves a new user.
    async fn save(&self, user: &User) -> StashResult<User>;

    /// Updates an existing user.
    async fn update(&self, user: &User) -> StashResult<User>;

    /// Deletes a user by ID.
    async fn delete(&self, id: UserId) -> StashResult<bool>;
}

/// User repository held in process memory.
#[derive(Component, Default)]
#[shaku(interface = UserRepository)]
pub struct InMemoryUserRepository {
    #[shaku(default)]
    users: RwLock<HashMap<UserId, User>>,
    #[shaku(default)]
    sequence: AtomicI64,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn username_taken(users: &HashMap<UserId, User>, username: &str, except: Option<UserId>) -> bool {
        let wanted = normalize_username(username);
        users
            .values()
            .any(|u| Some(u.id) != except && u.normalized_username() == wanted)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> StashResult<UserId> {
        Ok(UserId::new(self.sequence.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn find_by_id(&self, id: UserId) -> StashResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StashResult<Option<User>> {
        let wanted = normalize_username(username);
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.normalized_username() == wanted)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> StashResult<bool> {
        Ok(Self::username_taken(&self.users.read(), username, None))
    }

    async fn save(&self, user: &User) -> StashResult<User> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(StashError::conflict(format!("User {} already exists", user.id)));
        }
        if Self::username_taken(&users, &user.username, None) {
            return Err(StashError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        // Keep the sequence ahead of explicitly chosen IDs.
        self.sequence.fetch_max(user.id.into_inner(), Ordering::SeqCst);
        users.insert(user.id, user.clone());
        debug!("Saved user {}", user.id);
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> StashResult<User> {
        let mut users = self.users.write();
        if !users.contains_key(&user.id) {
            return Err(StashError::not_found("User", user.id));
        }
        if Self::username_taken(&users, &user.username, Some(user.id)) {
            return Err(StashError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        users.insert(user.id, user.clone());
        debug!("Updated user {}", user.id);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> StashResult<bool> {
        Ok(self.users.write().remove(&id).is_some())
    }
}

impl std::fmt::Debug for InMemoryUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryUserRepository")
            .field("users", &self.users.read().len())
            .finish_non_exhaustive()
    }
}
