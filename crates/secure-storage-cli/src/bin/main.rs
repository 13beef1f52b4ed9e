//! Secure Storage CLI - read and write encrypted entries from the shell
//!
//! Secrets come from flags or the `ENCRYPTION_KEY` / `ENCRYPTION_SALT`
//! environment variables. There is no default key: if either is missing the
//! command fails before touching the store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use secure_storage::config::{ENV_ITERATIONS, ENV_PASSPHRASE, ENV_SALT};
use secure_storage::{FileStore, KeyValueStore, SecureLocalStorage, StorageConfig};

/// Secure Storage - encrypted key-value entries on disk
#[derive(Parser, Debug)]
#[command(name = "secure-storage")]
#[command(author = "Symbia Labs")]
#[command(version = "0.1.0")]
#[command(about = "Encrypted key-value storage with AES-256-GCM and PBKDF2")]
struct Args {
    /// Passphrase the storage key is derived from
    #[arg(long, env = ENV_PASSPHRASE, hide_env_values = true, global = true)]
    passphrase: Option<String>,

    /// Salt the storage key is derived from
    #[arg(long, env = ENV_SALT, hide_env_values = true, global = true)]
    salt: Option<String>,

    /// PBKDF2 rounds (minimum 100000)
    #[arg(long, env = ENV_ITERATIONS, global = true)]
    iterations: Option<u32>,

    /// Directory holding the storage file (default: per-user data directory)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Encrypt and store a value
    Set { key: String, value: String },
    /// Print the decrypted value (exit code 1 when absent)
    Get { key: String },
    /// Delete an entry
    Remove { key: String },
    /// Delete every entry in the store
    Clear,
    /// List stored keys
    Keys,
}

impl Args {
    fn storage_config(&self) -> secure_storage::Result<StorageConfig> {
        let iterations = self.iterations.map(|n| n.to_string());

        StorageConfig::from_lookup(|name| match name {
            ENV_PASSPHRASE => self.passphrase.clone(),
            ENV_SALT => self.salt.clone(),
            ENV_ITERATIONS => iterations.clone(),
            _ => None,
        })
    }

    fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

async fn run<S: KeyValueStore>(
    storage: &SecureLocalStorage<S>,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Set { key, value } => {
            storage.set_item(&key, &value).await?;
            info!("Stored {}", key);
        }
        Command::Get { key } => match storage.get_item(&key).await {
            Some(value) => println!("{}", value),
            None => return Ok(ExitCode::FAILURE),
        },
        Command::Remove { key } => {
            storage.remove_item(&key)?;
            info!("Removed {}", key);
        }
        Command::Clear => {
            storage.clear()?;
            info!("Cleared all entries");
        }
        Command::Keys => {
            let mut keys = storage.keys()?;
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so `get` output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(args.log_level().into()),
        )
        .init();

    let config = args
        .storage_config()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    let store = match &args.store_dir {
        Some(dir) => FileStore::open(dir)?,
        None => FileStore::open_default()?,
    };
    info!("Using storage at {:?}", store.storage_dir());

    let storage = SecureLocalStorage::new(config, store)?;

    run(&storage, args.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use secure_storage::MemoryStore;

    #[test]
    fn test_parse_set() {
        let args = Args::try_parse_from([
            "secure-storage",
            "--passphrase",
            "p",
            "--salt",
            "s",
            "set",
            "auth_token",
            "abc123",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Set {
                key: "auth_token".to_string(),
                value: "abc123".to_string()
            }
        );
        assert_eq!(args.passphrase.as_deref(), Some("p"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "secure-storage",
            "get",
            "k",
            "--salt",
            "s",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.salt.as_deref(), Some("s"));
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_secret_flags_read_config_env_vars() {
        use clap::CommandFactory;

        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_owned())
        };

        assert_eq!(env_of("passphrase"), Some(ENV_PASSPHRASE.into()));
        assert_eq!(env_of("salt"), Some(ENV_SALT.into()));
        assert_eq!(env_of("iterations"), Some(ENV_ITERATIONS.into()));
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["secure-storage", "--passphrase", "p"]).is_err());
    }

    #[test]
    fn test_storage_config_from_flags() {
        let args = Args::try_parse_from([
            "secure-storage",
            "--passphrase",
            "p",
            "--salt",
            "s",
            "--iterations",
            "200000",
            "keys",
        ])
        .unwrap();

        let config = args.storage_config().unwrap();
        assert_eq!(config.passphrase.expose(), "p");
        assert_eq!(config.iterations, 200_000);
    }

    #[test]
    fn test_storage_config_requires_secrets() {
        let args = Args {
            passphrase: None,
            salt: Some("s".to_string()),
            iterations: None,
            store_dir: None,
            verbose: 0,
            command: Command::Keys,
        };

        assert!(args.storage_config().is_err());
    }

    #[tokio::test]
    async fn test_run_set_get_remove() {
        let storage =
            SecureLocalStorage::new(StorageConfig::new("p", "s"), MemoryStore::new()).unwrap();

        let code = run(
            &storage,
            Command::Set {
                key: "k".to_string(),
                value: "v".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(storage.get_item("k").await.as_deref(), Some("v"));

        run(&storage, Command::Remove { key: "k".to_string() })
            .await
            .unwrap();
        let code = run(&storage, Command::Get { key: "k".to_string() })
            .await
            .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_run_against_file_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let storage = SecureLocalStorage::new(StorageConfig::new("p", "s"), store).unwrap();

        run(
            &storage,
            Command::Set {
                key: "csrf_token".to_string(),
                value: "xyz".to_string(),
            },
        )
        .await
        .unwrap();

        let reopened = SecureLocalStorage::new(
            StorageConfig::new("p", "s"),
            FileStore::open(temp_dir.path()).unwrap(),
        )
        .unwrap();
        assert_eq!(reopened.get_item("csrf_token").await.as_deref(), Some("xyz"));

        run(&reopened, Command::Clear).await.unwrap();
        assert!(reopened.keys().unwrap().is_empty());
    }
}
