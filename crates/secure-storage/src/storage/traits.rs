//! Storage trait definitions

use crate::error::Result;

/// Synchronous string key-value store underneath the encrypting facade.
///
/// Each call is atomic for a single key. Implementations do not know or care
/// that values are ciphertext.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Delete every entry in the store
    fn clear(&self) -> Result<()>;

    /// List all keys currently present
    fn keys(&self) -> Result<Vec<String>>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
