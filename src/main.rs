//! prefstore command line
//!
//! Inspects and edits one namespace of the configured store.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};
    use prefstore::{KeyValueStore, StorageHandler, StoreSettings, hash};

    #[derive(Debug, thiserror::Error)]
    enum CliError {
        #[error(transparent)]
        Store(#[from] prefstore::Error),
        #[error("invalid JSON value: {0}")]
        InvalidJson(#[from] serde_json::Error),
        #[error("failed to clear namespace")]
        ClearFailed,
    }

    #[derive(Parser, Debug)]
    #[command(name = "prefstore", about = "Inspect and edit stored preferences")]
    struct Cli {
        /// Store file (overrides settings)
        #[arg(long, env = "PREFSTORE_PATH")]
        path: Option<PathBuf>,

        /// Owner scope hashed into the namespace
        #[arg(long, env = "PREFSTORE_SCOPE")]
        scope: Option<String>,

        /// JSON settings file
        #[arg(long, env = "PREFSTORE_SETTINGS")]
        settings: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Print the SHA-256 hex digest of TEXT
        Hash { text: String },
        #[command(flatten)]
        Store(StoreCommand),
    }

    /// Commands that work against the configured store
    #[derive(Subcommand, Debug)]
    enum StoreCommand {
        /// Print the namespace a scope maps to
        Namespace,
        /// Print the stored JSON for KEY
        Get { key: String },
        /// Store a JSON value under KEY
        Set { key: String, json: String },
        /// Remove every entry in the namespace
        Clear,
        /// List every entry in the namespace
        Dump,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        let command = match cli.command {
            Command::Hash { text } => {
                println!("{}", hash(&text));
                return Ok(());
            }
            Command::Store(command) => command,
        };

        let mut settings = match &cli.settings {
            Some(path) => StoreSettings::load(path)?,
            None => StoreSettings::default(),
        }
        .with_overrides(|name| std::env::var(name).ok());
        if let Some(path) = cli.path {
            settings.path = path;
        }
        if let Some(scope) = cli.scope {
            settings.scope = scope;
        }

        let handler = StorageHandler::new(&settings.scope, settings.open_store()?);
        execute(&handler, command)?;
        Ok(())
    }

    fn execute<S: KeyValueStore>(
        handler: &StorageHandler<S>,
        command: StoreCommand,
    ) -> Result<(), CliError> {
        match command {
            StoreCommand::Namespace => println!("{}", handler.namespace()),
            StoreCommand::Get { key } => {
                match handler.load_typed::<Option<serde_json::Value>>(&key, None)? {
                    Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                    None => log::warn!("No entry for {key}"),
                }
            }
            StoreCommand::Set { key, json } => {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                handler.save_typed(&key, &value)?;
                log::info!("Saved {key}");
            }
            StoreCommand::Clear => {
                if !handler.clear_preferences() {
                    return Err(CliError::ClearFailed);
                }
            }
            StoreCommand::Dump => {
                for (key, text) in handler.store().entries(handler.namespace().as_str())? {
                    println!("{key} = {text}");
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use prefstore::{Backend, Value};

        #[test]
        fn test_hash_is_split_from_store_commands() {
            let cli = Cli::try_parse_from(["prefstore", "hash", "test"]).unwrap();
            assert!(matches!(cli.command, Command::Hash { text } if text == "test"));

            let cli = Cli::try_parse_from(["prefstore", "--scope", "app", "dump"]).unwrap();
            assert!(matches!(cli.command, Command::Store(StoreCommand::Dump)));
            assert_eq!(cli.scope.as_deref(), Some("app"));
        }

        #[test]
        fn test_memory_backend_is_honored() {
            let path = std::env::temp_dir()
                .join(format!("prefstore_cli_{}.json", uuid::Uuid::new_v4()));
            let settings = StoreSettings {
                backend: Backend::Memory,
                path: path.clone(),
                scope: "cli".to_string(),
            };
            let handler = StorageHandler::new(&settings.scope, settings.open_store().unwrap());

            let set = StoreCommand::Set {
                key: "count".to_string(),
                json: "3".to_string(),
            };
            execute(&handler, set).unwrap();
            assert_eq!(handler.load_object("count", Value::Int(0)).unwrap(), Value::Int(3));
            execute(&handler, StoreCommand::Dump).unwrap();
            execute(&handler, StoreCommand::Clear).unwrap();
            let left = handler.store().entries(handler.namespace().as_str()).unwrap();
            assert!(left.is_empty());

            // nothing touched the file path
            assert!(!path.exists());
        }

        #[test]
        fn test_set_rejects_bad_json() {
            let settings = StoreSettings {
                backend: Backend::Memory,
                ..Default::default()
            };
            let handler = StorageHandler::new(&settings.scope, settings.open_store().unwrap());
            let set = StoreCommand::Set {
                key: "k".to_string(),
                json: "{oops".to_string(),
            };
            assert!(matches!(execute(&handler, set), Err(CliError::InvalidJson(_))));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    prefstore::platform::init_logging();
    log::info!("prefstore (native) starting...");

    if let Err(err) = cli::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is prefstore::wasm_start, this is just to satisfy the compiler
}
