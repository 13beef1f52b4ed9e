//! Secret material configuration
//!
//! The passphrase and salt are injected by the host at construction time.
//! Nothing in the library reads the process environment except
//! [`StorageConfig::from_env`], which the host calls explicitly.

use tracing::debug;

use crate::crypto::{SecretString, DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::error::{Result, StorageError};

/// Environment variable holding the passphrase seed
pub const ENV_PASSPHRASE: &str = "ENCRYPTION_KEY";
/// Environment variable holding the salt seed
pub const ENV_SALT: &str = "ENCRYPTION_SALT";
/// Optional override for the PBKDF2 round count
pub const ENV_ITERATIONS: &str = "ENCRYPTION_ITERATIONS";

/// Passphrase, salt and PBKDF2 cost used to derive the storage key
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub passphrase: SecretString,
    pub salt: String,
    pub iterations: u32,
}

impl StorageConfig {
    /// Create a config with the default iteration count
    pub fn new(passphrase: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            passphrase: SecretString::new(passphrase),
            salt: salt.into(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Reject empty secrets and weak round counts
    pub fn validate(&self) -> Result<()> {
        if self.passphrase.is_empty() {
            return Err(StorageError::Config("passphrase must not be empty".to_string()));
        }
        if self.salt.is_empty() {
            return Err(StorageError::Config("salt must not be empty".to_string()));
        }
        if self.iterations < MIN_ITERATIONS {
            return Err(StorageError::Config(format!(
                "iterations must be at least {}, got {}",
                MIN_ITERATIONS, self.iterations
            )));
        }
        Ok(())
    }

    /// Load from `ENCRYPTION_KEY`, `ENCRYPTION_SALT` and `ENCRYPTION_ITERATIONS`.
    ///
    /// A missing passphrase or salt is an error. There is no built-in default
    /// key: a deployment that forgets to configure one must not silently
    /// encrypt under a publicly known secret.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StorageError::Config(format!("{} is not set", name)))
        };

        let passphrase = required(ENV_PASSPHRASE)?;
        let salt = required(ENV_SALT)?;

        let iterations = match lookup(ENV_ITERATIONS) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                StorageError::Config(format!("{} is not a number: {}", ENV_ITERATIONS, e))
            })?,
            None => DEFAULT_ITERATIONS,
        };

        let config = Self::new(passphrase, salt).with_iterations(iterations);
        config.validate()?;

        debug!("Loaded storage config from environment ({} iterations)", iterations);
        Ok(config)
    }
}
