//! Credentials storage and management.
//!
//! Stores the identity provider's access token and the user's model
//! provider API key in `~/.parley/.credentials.json`.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::traits::CredentialsError;

/// The application directory name under `$HOME`.
pub const APP_DIR: &str = ".parley";

/// The credentials file name.
const CREDENTIALS_FILE: &str = ".credentials.json";

/// Locally stored credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Bearer token issued by the identity provider.
    #[serde(default)]
    pub access_token: Option<String>,
    /// The authenticated user's ID (the token's `sub` claim).
    #[serde(default)]
    pub user_id: Option<String>,
    /// Token expiration time as Unix timestamp (seconds since epoch).
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// User-provided model provider key, forwarded with chat requests.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Credentials {
    /// Check if the credentials have an access token.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Check if the token is expired.
    ///
    /// A token without a known expiration is treated as live; the backend
    /// rejects it with 401 if it is not.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// Check if the credentials are usable (has token and not expired).
    pub fn is_valid(&self) -> bool {
        self.has_token() && !self.is_expired()
    }

    /// `Bearer <token>` for the Authorization header.
    pub fn bearer_header(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }

    /// True when every field is unset.
    pub fn is_empty(&self) -> bool {
        self == &Credentials::default()
    }
}

/// Manages credential storage and retrieval.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Create a manager for `~/.parley/.credentials.json`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_path(home.join(APP_DIR)))
    }

    /// Create a manager storing its file under `dir`.
    pub fn with_path(dir: PathBuf) -> Self {
        Self {
            credentials_path: dir.join(CREDENTIALS_FILE),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Load credentials from the credentials file.
    ///
    /// Returns default credentials if the file doesn't exist or can't be parsed.
    pub fn load(&self) -> Credentials {
        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(_) => return Credentials::default(),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(creds) => creds,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable credentials file {}: {}",
                    self.credentials_path.display(),
                    e
                );
                Credentials::default()
            }
        }
    }

    /// Save credentials, creating the parent directory if needed.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        if let Some(parent) = self.credentials_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CredentialsError::Io(e.to_string()))?;
        }

        let file =
            File::create(&self.credentials_path).map_err(|e| CredentialsError::Io(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, credentials)
            .map_err(|e| CredentialsError::Serialization(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| CredentialsError::Io(e.to_string()))?;

        restrict_permissions(&self.credentials_path);
        Ok(())
    }

    /// Remove the credentials file. Succeeds if it didn't exist.
    pub fn clear(&self) -> Result<(), CredentialsError> {
        match fs::remove_file(&self.credentials_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialsError::Io(e.to_string())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
