use std::path::PathBuf;

use anyhow::Context;

use crate::backup::BackupLayout;
use crate::error::BackupError;
use crate::firestore::client::FirestoreClientOptions;

/// Where the service account key lives, relative to the home directory.
pub const CREDENTIALS_PATH: &str = ".config/awalog/serviceAccountKey.json";

pub const DEFAULT_PRODUCTION_ENV: &str = "prod";

/// `~/.config/awalog/serviceAccountKey.json`, or `None` when there is no
/// home directory to speak of.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CREDENTIALS_PATH))
}

/// Everything a command needs to know besides its own arguments.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` means the default under the home directory, resolved when a
    /// command first needs credentials.
    pub credentials: Option<PathBuf>,
    pub client_options: FirestoreClientOptions,
    pub layout: BackupLayout,
    /// Exports into this environment must be confirmed.
    pub production_env: String,
}

impl Settings {
    pub fn new(
        credentials: Option<PathBuf>,
        backup_root: impl Into<PathBuf>,
        host_url: impl Into<String>,
        production_env: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            client_options: FirestoreClientOptions::default().host_url(host_url),
            layout: BackupLayout::new(backup_root),
            production_env: production_env.into(),
        }
    }

    /// The service account key to use, falling back to
    /// [`default_credentials_path`] when none was given.
    pub fn credentials(&self) -> Result<PathBuf, BackupError> {
        match &self.credentials {
            Some(path) => Ok(path.clone()),
            None => Ok(default_credentials_path()
                .context("Could not determine the home directory; pass --credentials")?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn explicit_credentials_win() {
        let settings = Settings::new(
            Some(PathBuf::from("/etc/awalog/key.json")),
            "snapshots",
            "http://127.0.0.1:8081",
            "production",
        );

        assert_eq!(
            settings.credentials().unwrap(),
            Path::new("/etc/awalog/key.json")
        );
        assert_eq!(settings.layout.root(), Path::new("snapshots"));
        assert_eq!(settings.client_options.host_url, "http://127.0.0.1:8081");
        assert_eq!(settings.production_env, "production");
    }

    #[test]
    fn missing_credentials_are_resolved_lazily() {
        let settings = Settings::new(None, "backup", "http://127.0.0.1:8081", "prod");

        assert_eq!(settings.credentials, None);
        assert_eq!(settings.layout.root(), Path::new("backup"));
        match default_credentials_path() {
            Some(path) => assert_eq!(settings.credentials().unwrap(), path),
            None => assert!(settings.credentials().is_err()),
        }
    }

    #[test]
    fn default_credentials_live_under_the_home_directory() {
        if let Some(path) = default_credentials_path() {
            assert!(path.ends_with(".config/awalog/serviceAccountKey.json"));
        }
    }
}
