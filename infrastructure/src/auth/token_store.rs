//! File-backed bearer token storage.
//!
//! One token per installation, stored as a plain file under the platform
//! data directory. Absence of the file simply means "not logged in".

use detect_application::CredentialStore;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Credential store persisting the bearer token to a single file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default token location: `{data_dir}/detect-auto/token`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("detect-auto").join("token"))
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn store(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Could not create token directory {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            warn!("Could not persist token to {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}
