//! Cache keys and namespaces.
//!
//! A [`CacheKey`] pairs a [`Namespace`] with a value derived from the
//! arguments of the cached operation. Key builders return `Option<CacheKey>`:
//! an empty argument component yields `None` and the operation runs
//! uncached.

use std::fmt;

/// Separator between the prefix, namespace, and value of a rendered key.
pub const KEY_SEPARATOR: char = ':';

/// Logical grouping of keys sharing TTL and eviction policy.
///
/// Names are static identifiers such as `userById` and must not contain
/// [`KEY_SEPARATOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(&'static str);

impl Namespace {
    /// Creates a namespace from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the namespace name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns the backend match pattern for every key of this namespace.
    #[must_use]
    pub fn pattern(&self, prefix: &str) -> String {
        format!("{prefix}{KEY_SEPARATOR}{}{KEY_SEPARATOR}*", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Deterministic key of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    value: String,
}

impl CacheKey {
    /// Creates a key, or `None` when the value is empty or blank.
    #[must_use]
    pub fn new(namespace: Namespace, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self { namespace, value })
    }

    /// Creates a key from an optional argument component.
    #[must_use]
    pub fn derive<T: fmt::Display>(namespace: Namespace, component: Option<T>) -> Option<Self> {
        component.and_then(|c| Self::new(namespace, c.to_string()))
    }

    /// Returns the namespace.
    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Returns the argument-derived value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the backend key: `<prefix>:<namespace>:<value>`.
    ///
    /// The namespace contains no separator, so two keys render equal only
    /// when both namespace and value are equal.
    #[must_use]
    pub fn render(&self, prefix: &str) -> String {
        format!(
            "{prefix}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.namespace, self.value
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.namespace, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_BY_ID: Namespace = Namespace::new("userById");

    #[test]
    fn test_key_display_and_render() {
        let key = CacheKey::new(USER_BY_ID, "42").unwrap();
        assert_eq!(key.to_string(), "userById:42");
        assert_eq!(key.render("stash"), "stash:userById:42");
    }

    #[test]
    fn test_blank_component_yields_no_key() {
        assert!(CacheKey::new(USER_BY_ID, "").is_none());
        assert!(CacheKey::new(USER_BY_ID, "   ").is_none());
        assert!(CacheKey::derive::<i64>(USER_BY_ID, None).is_none());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = CacheKey::derive(USER_BY_ID, Some(42)).unwrap();
        let b = CacheKey::derive(USER_BY_ID, Some(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.render("p"), b.render("p"));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let by_name = CacheKey::new(Namespace::new("userByUsername"), "ann").unwrap();
        let exists = CacheKey::new(Namespace::new("userExistsByUsername"), "ann").unwrap();
        assert_ne!(by_name, exists);
        assert_ne!(by_name.render("stash"), exists.render("stash"));
    }

    #[test]
    fn test_namespace_pattern() {
        assert_eq!(USER_BY_ID.pattern("stash"), "stash:userById:*");
    }
}
