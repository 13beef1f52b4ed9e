//! Error types for secure-storage

use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Caller-visible errors on the write path and during setup
#[derive(Error, Debug)]
pub enum StorageError {
    /// The crypto provider could not run (blocking pool gone, cipher init failed)
    #[error("Crypto provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The backing store rejected a read or write (quota, disabled, poisoned lock)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a stored blob could not be turned back into plaintext.
///
/// Never surfaced from `SecureLocalStorage::get_item`; the facade deletes the
/// entry and reports absence instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("Blob is not valid base64: {0}")]
    Malformed(String),

    #[error("Blob too short: {len} bytes")]
    TooShort { len: usize },

    #[error("Authentication tag did not verify")]
    Authentication,

    #[error("Plaintext is not valid UTF-8")]
    InvalidUtf8,
}
