//! API credential storage
//!
//! The remote backend needs a single secret string. Where that secret lives
//! is the host's business; these are the stores Papyrus ships with.

use papyrus_domain::traits::CredentialStore;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Environment variables consulted by [`EnvCredentialStore::default`], in order
pub const DEFAULT_KEY_VARS: [&str; 2] = ["PAPYRUS_API_KEY", "OPENAI_API_KEY"];

/// Errors from credential stores
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Reading or writing the secret failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store cannot be written to
    #[error("Credential store is read-only: {0}")]
    ReadOnly(String),

    /// No home directory to keep the credential file in
    #[error("Could not find home directory")]
    NoHomeDir,
}

/// Reads the key from environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    vars: Vec<String>,
}

impl EnvCredentialStore {
    /// Consult the given variables in order
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_VARS)
    }
}

impl CredentialStore for EnvCredentialStore {
    type Error = CredentialError;

    fn load(&self) -> Result<Option<String>, Self::Error> {
        Ok(first_non_empty_var(&self.vars))
    }

    fn store(&self, _secret: &str) -> Result<(), Self::Error> {
        Err(CredentialError::ReadOnly(format!(
            "set one of {} instead",
            self.vars.join(", ")
        )))
    }
}

fn first_non_empty_var(vars: &[String]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Keeps the key in a private file under the user's home directory.
///
/// An environment variable, when set, takes precedence over the file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    env_override: Vec<String>,
}

impl FileCredentialStore {
    /// Store the key at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_override: Vec::new(),
        }
    }

    /// `~/.papyrus/credentials`
    pub fn default_path() -> Result<PathBuf, CredentialError> {
        let home = dirs::home_dir().ok_or(CredentialError::NoHomeDir)?;
        Ok(home.join(".papyrus").join("credentials"))
    }

    /// Let the given environment variables override the file contents
    pub fn with_env_override<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_override = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Location of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    type Error = CredentialError;

    fn load(&self) -> Result<Option<String>, Self::Error> {
        if let Some(value) = first_non_empty_var(&self.env_override) {
            return Ok(Some(value));
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let key = contents.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, secret: &str) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            private_dir_builder().create(parent)?;
        }

        let mut file = private_file_options().open(&self.path)?;

        // The mode passed at creation does not apply to an existing file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(secret.trim().as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

fn private_dir_builder() -> fs::DirBuilder {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
}

fn private_file_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Holds the key in memory. Useful for hosts that manage secrets themselves
/// and for tests.
#[derive(Debug, Default)]
pub struct StaticCredential {
    secret: Mutex<Option<String>>,
}

impl StaticCredential {
    /// Store holding `secret`
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Mutex::new(Some(secret.into())),
        }
    }

    /// Store holding nothing
    pub fn empty() -> Self {
        Self::default()
    }
}

impl CredentialStore for StaticCredential {
    type Error = CredentialError;

    fn load(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.secret.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, secret: &str) -> Result<(), Self::Error> {
        *self.secret.lock().unwrap_or_else(PoisonError::into_inner) = Some(secret.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential() {
        let store = StaticCredential::empty();
        assert_eq!(store.load().unwrap(), None);
        store.store("sk-test").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials"));

        assert_eq!(store.load().unwrap(), None);
        store.store("  sk-abc\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("sk-abc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join(".papyrus");
        let store = FileCredentialStore::new(home.join("credentials"));
        store.store("sk-abc").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let dir_mode = fs::metadata(&home).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_readable_file_made_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "old-key").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(&path);
        store.store("sk-new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("sk-new"));
    }

    #[test]
    fn test_blank_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "\n  \n").unwrap();

        assert_eq!(FileCredentialStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_env_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials"))
            .with_env_override(["PAPYRUS_TEST_OVERRIDE_KEY"]);
        store.store("from-file").unwrap();

        std::env::set_var("PAPYRUS_TEST_OVERRIDE_KEY", "from-env");
        assert_eq!(store.load().unwrap().as_deref(), Some("from-env"));
        std::env::remove_var("PAPYRUS_TEST_OVERRIDE_KEY");
        assert_eq!(store.load().unwrap().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_env_store_is_read_only() {
        let store = EnvCredentialStore::new(["PAPYRUS_TEST_UNSET_KEY"]);
        assert_eq!(store.load().unwrap(), None);
        assert!(matches!(store.store("x"), Err(CredentialError::ReadOnly(_))));
    }
}
