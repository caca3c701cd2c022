//! Cache namespaces and key builders for user lookups.
//!
//! Each cached operation has one builder. A builder returns `None` when an
//! argument is blank, and the operation then runs uncached.

use stash_cache::{CacheKey, Namespace};
use stash_core::{normalize_username, UserId};

/// Users by identifier.
pub const USER_BY_ID: Namespace = Namespace::new("userById");

/// Users by normalised username.
pub const USER_BY_USERNAME: Namespace = Namespace::new("userByUsername");

/// Username existence checks.
pub const USER_EXISTS_BY_USERNAME: Namespace = Namespace::new("userExistsByUsername");

/// Key for a user by ID.
#[must_use]
pub fn user_by_id(id: UserId) -> Option<CacheKey> {
    CacheKey::derive(USER_BY_ID, Some(id))
}

/// Key for a user by username.
#[must_use]
pub fn user_by_username(username: &str) -> Option<CacheKey> {
    CacheKey::new(USER_BY_USERNAME, normalize_username(username))
}

/// Key for a username existence check.
#[must_use]
pub fn username_exists(username: &str) -> Option<CacheKey> {
    CacheKey::new(USER_EXISTS_BY_USERNAME, normalize_username(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_by_id_key() {
        let key = user_by_id(UserId::new(42)).unwrap();
        assert_eq!(key.to_string(), "userById:42");
    }

    #[test]
    fn test_user_by_username_key() {
        let key = user_by_username(" Ann ").unwrap();
        assert_eq!(key.to_string(), "userByUsername:ann");
    }

    #[test]
    fn test_username_exists_key() {
        let key = username_exists("ANN").unwrap();
        assert_eq!(key.to_string(), "userExistsByUsername:ann");
    }

    #[test]
    fn test_blank_username_has_no_key() {
        assert!(user_by_username("").is_none());
        assert!(username_exists("   ").is_none());
    }
}
