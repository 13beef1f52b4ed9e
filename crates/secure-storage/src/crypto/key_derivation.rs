//! Password-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::MasterKey;
use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

/// Round count used when the host does not pick one
pub const DEFAULT_ITERATIONS: u32 = 100_000;
/// Lowest round count accepted
pub const MIN_ITERATIONS: u32 = 100_000;

/// Derive a 256-bit key from a passphrase and salt
///
/// # Arguments
/// * `passphrase` - The configured passphrase seed
/// * `salt` - The configured salt seed
/// * `iterations` - PBKDF2 rounds, at least [`MIN_ITERATIONS`]
///
/// # Returns
/// A 32-byte key suitable for AES-256-GCM. Identical inputs always produce
/// an identical key.
pub fn derive_key(passphrase: &str, salt: &str, iterations: u32) -> Result<MasterKey> {
    if passphrase.is_empty() {
        return Err(StorageError::KeyDerivation("empty passphrase".to_string()));
    }
    if salt.is_empty() {
        return Err(StorageError::KeyDerivation("empty salt".to_string()));
    }
    if iterations < MIN_ITERATIONS {
        return Err(StorageError::KeyDerivation(format!(
            "{} iterations is below the minimum of {}",
            iterations, MIN_ITERATIONS
        )));
    }

    let mut key_bytes = [0u8; 32];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt.as_bytes(), iterations, &mut key_bytes);

    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

/// Derive the key for `config` on the blocking thread pool
///
/// A blocking task that panics or is cancelled means the provider cannot
/// serve requests; that is reported as [`StorageError::ProviderUnavailable`].
pub async fn derive_key_async(config: &StorageConfig) -> Result<MasterKey> {
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        derive_key(config.passphrase.expose(), &config.salt, config.iterations)
    })
    .await
    .map_err(|e| StorageError::ProviderUnavailable(e.to_string()))?
}
