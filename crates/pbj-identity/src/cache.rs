//! Flyweight interner for identity objects
//!
//! Equal canonical strings must always yield the same shared instance, so
//! each interned identity type keeps one process-wide `Interner` keyed by
//! the canonical string. Lookups vastly outnumber inserts (inserts happen
//! once per distinct identity, typically at startup), which is the access
//! pattern dashmap is built for.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// A concurrent string-keyed cache of shared instances.
pub struct Interner<T> {
    entries: DashMap<String, Arc<T>>,
}

impl<T> Interner<T> {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached instance for `key`, or build, cache, and return a
    /// new one. The builder runs only on a cache miss; a builder failure
    /// caches nothing.
    pub fn get_or_try_insert<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<Arc<T>, E> {
        if let Some(existing) = self.entries.get(key) {
            trace!(key, "interner hit");
            return Ok(existing.clone());
        }

        let built = Arc::new(build()?);
        trace!(key, "interner miss, caching new instance");

        // Two threads can race past the lookup; entry() keeps the winner so
        // both callers end up holding the same Arc.
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| built);
        Ok(entry.clone())
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the interner holds no instances.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is already cached.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_then_hit_returns_same_arc() {
        let interner: Interner<String> = Interner::new();

        let a = interner
            .get_or_try_insert("k", || Ok::<_, ()>("value".to_string()))
            .unwrap();
        let b = interner
            .get_or_try_insert("k", || Ok::<_, ()>("other".to_string()))
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "value");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_builder_failure_caches_nothing() {
        let interner: Interner<String> = Interner::new();

        let result = interner.get_or_try_insert("bad", || Err::<String, _>("boom"));
        assert!(result.is_err());
        assert!(!interner.contains("bad"));
        assert!(interner.is_empty());
    }

    #[test]
    fn test_distinct_keys_distinct_instances() {
        let interner: Interner<String> = Interner::new();

        let a = interner
            .get_or_try_insert("a", || Ok::<_, ()>("a".to_string()))
            .unwrap();
        let b = interner
            .get_or_try_insert("b", || Ok::<_, ()>("b".to_string()))
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 2);
    }
}
