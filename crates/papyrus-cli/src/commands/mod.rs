//! Command implementations.

pub mod backend;
pub mod config;
pub mod import;
pub mod list;
pub mod remove;
pub mod search;

pub use self::backend::{execute_backend, execute_set_key};
pub use self::config::execute_config;
pub use self::import::execute_import;
pub use self::list::{execute_list, execute_show};
pub use self::remove::execute_remove;
pub use self::search::execute_search;

use crate::config::Config;
use crate::error::Result;
use papyrus_llm::{FileCredentialStore, DEFAULT_KEY_VARS};
use papyrus_store::SqliteStore;
use std::fs;

/// Open the library database, creating its directory if needed.
pub(crate) fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::open(path)?)
}

/// The API key store: `~/.papyrus/credentials`, overridden by the key
/// environment variables when they are set.
pub(crate) fn credential_store() -> Result<FileCredentialStore> {
    let path = FileCredentialStore::default_path()?;
    Ok(FileCredentialStore::new(path).with_env_override(DEFAULT_KEY_VARS))
}
