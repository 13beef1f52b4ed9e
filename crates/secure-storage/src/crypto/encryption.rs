//! AES-256-GCM authenticated encryption
//!
//! Blob format: `base64(nonce || ciphertext || auth_tag)`
//! - Nonce: 12 bytes (96 bits), random per call
//! - Ciphertext: same length as the plaintext
//! - Auth tag: 16 bytes (128 bits)
//!
//! The blob is self-describing; the nonce travels with it.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

use super::MasterKey;
use crate::error::{DecryptError, Result, StorageError};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Nonce plus ciphertext with the auth tag appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Raw `nonce || ciphertext || tag` bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split raw bytes into nonce and ciphertext
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, DecryptError> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptError::TooShort { len: bytes.len() });
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Parse the base64 form produced by `Display`
    pub fn parse(s: &str) -> std::result::Result<Self, DecryptError> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| DecryptError::Malformed(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&STANDARD.encode(self.to_bytes()))
    }
}

fn cipher_for(key: &MasterKey) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}

/// Encrypt plaintext under a fresh random nonce
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedBlob> {
    let cipher = cipher_for(key);

    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    // aes-gcm appends the auth tag to the ciphertext
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| StorageError::Encryption(e.to_string()))?;

    Ok(EncryptedBlob { nonce, ciphertext })
}

/// Encrypt a string and return the base64 blob
pub fn encrypt_string(plaintext: &str, key: &MasterKey) -> Result<String> {
    let blob = encrypt(plaintext.as_bytes(), key)?;
    Ok(blob.to_string())
}

/// Decrypt and verify a blob
pub fn decrypt(
    blob: &EncryptedBlob,
    key: &MasterKey,
) -> std::result::Result<Vec<u8>, DecryptError> {
    cipher_for(key)
        .decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_slice())
        .map_err(|_| DecryptError::Authentication)
}

/// Decrypt a base64 blob back into a string
pub fn decrypt_string(
    encoded: &str,
    key: &MasterKey,
) -> std::result::Result<String, DecryptError> {
    let blob = EncryptedBlob::parse(encoded)?;
    let plaintext = decrypt(&blob, key)?;
    String::from_utf8(plaintext).map_err(|_| DecryptError::InvalidUtf8)
}
