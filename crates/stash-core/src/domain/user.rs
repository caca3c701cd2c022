//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity as stored by the origin data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the origin store.
    pub id: UserId,

    /// Unique username. Lookups by username are case-insensitive.
    pub username: String,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: Option<String>,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user. The timestamps are set to now.
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, name: impl Into<String>, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            name: name.into(),
            email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the username normalised for lookups.
    #[must_use]
    pub fn normalized_username(&self) -> String {
        normalize_username(&self.username)
    }

    /// Updates the mutable profile fields.
    pub fn update_profile(&mut self, name: Option<String>, email: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if email.is_some() {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}

/// Normalises a username for case-insensitive lookups.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_timestamps() {
        let user = User::new(UserId::new(1), "ann", "Ann", None);
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.name, "Ann");
    }

    #[test]
    fn test_update_profile_keeps_unset_fields() {
        let mut user = User::new(UserId::new(1), "ann", "Ann", Some("ann@example.com".to_string()));
        user.update_profile(Some("Ann Lee".to_string()), None);
        assert_eq!(user.name, "Ann Lee");
        assert_eq!(user.email.as_deref(), Some("ann@example.com"));
        assert!(user.updated_at >= user.created_at);
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Ann "), "ann");
        let user = User::new(UserId::new(2), "BoB", "Bob", None);
        assert_eq!(user.normalized_username(), "bob");
    }
}
