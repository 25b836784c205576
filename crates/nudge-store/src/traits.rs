//! Store trait definitions

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::StoreResult;

/// Flat key/value store partitioned into namespaces.
///
/// Values are opaque strings. There is no query-by-field capability; callers
/// that need secondary lookups maintain their own index keys.
pub trait Store: Send + Sync {
    /// Read a value, `None` if absent or expired
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one. `ttl = None` keeps it forever.
    fn set(&self, namespace: &str, key: &str, value: &str, ttl: Option<Duration>)
    -> StoreResult<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// JSON helpers for any [`Store`]
pub trait StoreExt {
    fn get_json<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> StoreResult<Option<T>>;

    fn set_json<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> StoreResult<()>;
}

impl<S: Store + ?Sized> StoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> StoreResult<Option<T>> {
        match self.get(namespace, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(namespace, key, &raw, ttl)
    }
}
