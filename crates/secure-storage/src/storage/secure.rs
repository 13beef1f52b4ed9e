//! Encrypting facade over a [`KeyValueStore`]
//!
//! Every logical key is either absent or present as an encrypted blob.
//! Reads never fail: a blob that cannot be decrypted is deleted and reported
//! as absent, so a tampered entry or one written under an older passphrase
//! cannot block the caller forever. Callers therefore cannot tell
//! "never stored" from "discarded as corrupt".

use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use super::KeyValueStore;
use crate::config::StorageConfig;
use crate::crypto::{decrypt_string, derive_key_async, encrypt_string, MasterKey};
use crate::error::{DecryptError, Result};

/// Encrypted key-value storage
pub struct SecureLocalStorage<S> {
    config: StorageConfig,
    store: S,
    /// Derived on first use, then reused for the lifetime of the facade
    key: OnceCell<MasterKey>,
}

impl<S: KeyValueStore> SecureLocalStorage<S> {
    /// Wrap `store`, encrypting under the key derived from `config`
    pub fn new(config: StorageConfig, store: S) -> Result<Self> {
        config.validate()?;

        debug!("Secure storage created over {}", store.backend_name());

        Ok(Self {
            config,
            store,
            key: OnceCell::new(),
        })
    }

    /// Access the underlying store (raw ciphertext)
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn master_key(&self) -> Result<&MasterKey> {
        self.key
            .get_or_try_init(|| derive_key_async(&self.config))
            .await
    }

    /// Encrypt `value` and write it under `key`, replacing any previous value
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let master_key = self.master_key().await?;
        let blob = encrypt_string(value, master_key)?;

        self.store.set_item(key, &blob)?;

        debug!("Stored encrypted key: {}", key);
        Ok(())
    }

    /// Read and decrypt the value under `key`.
    ///
    /// Returns `None` when the key is absent, when its blob fails to decrypt
    /// (the entry is deleted first), or when the key or backend is
    /// unavailable (the entry is left alone).
    pub async fn get_item(&self, key: &str) -> Option<String> {
        let encoded = match self.store.get_item(key) {
            Ok(Some(encoded)) => encoded,
            Ok(None) => {
                debug!("Key not found: {}", key);
                return None;
            }
            Err(e) => {
                error!("Failed to read key {} from {}: {}", key, self.store.backend_name(), e);
                return None;
            }
        };

        let master_key = match self.master_key().await {
            Ok(master_key) => master_key,
            Err(e) => {
                error!("Cannot decrypt key {}: {}", key, e);
                return None;
            }
        };

        match decrypt_string(&encoded, master_key) {
            Ok(value) => {
                debug!("Retrieved key: {}", key);
                Some(value)
            }
            Err(reason) => {
                self.discard(key, &reason);
                None
            }
        }
    }

    fn discard(&self, key: &str, reason: &DecryptError) {
        warn!("Discarding undecryptable entry {}: {}", key, reason);

        if let Err(e) = self.store.remove_item(key) {
            error!("Failed to remove corrupted entry {}: {}", key, e);
        }
    }

    /// Delete `key`; absent keys are fine
    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.store.remove_item(key)?;
        debug!("Removed key: {}", key);
        Ok(())
    }

    /// Delete every entry in the underlying store, including entries this
    /// facade did not write
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        debug!("Cleared {}", self.store.backend_name());
        Ok(())
    }

    /// Whether a raw entry exists under `key`, without decrypting it
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.store.get_item(key)?.is_some())
    }

    /// List the keys present in the underlying store
    pub fn keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }
}
