//! Cryptographic primitives for encrypted storage
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with self-describing blobs
//! - PBKDF2-HMAC-SHA256 key derivation from a passphrase and salt
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{
    decrypt, decrypt_string, encrypt, encrypt_string, EncryptedBlob, NONCE_LEN, TAG_LEN,
};
pub use key_derivation::{derive_key, derive_key_async, DEFAULT_ITERATIONS, MIN_ITERATIONS};
pub use secure_memory::{MasterKey, SecretString};
