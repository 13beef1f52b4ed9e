//! # secure-storage
//!
//! Encrypted key-value storage including:
//! - PBKDF2-HMAC-SHA256 key derivation from a configured passphrase and salt
//! - AES-256-GCM values stored as self-describing base64 blobs
//! - Pluggable synchronous backends (in-memory, JSON file)
//! - Self-healing reads: undecryptable entries are deleted and read as absent

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;

pub use config::StorageConfig;
pub use crypto::{decrypt_string, derive_key, encrypt_string, MasterKey, SecretString};
pub use error::{DecryptError, Result, StorageError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SecureLocalStorage};
