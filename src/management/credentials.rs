use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    Res,
    types::{Credential, CredentialField},
};

/// Durable key/value record holding the OAuth state.
///
/// Every read-modify-write runs under one lock and lands on disk through a
/// temp file that is renamed over the record, so a crash never leaves a
/// half-written file behind. A record that cannot be parsed is treated as
/// empty and rewritten.
pub struct CredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Res<Credential> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Merges the fields set in `patch` into the record and persists it.
    pub async fn write(&self, patch: Credential) -> Res<Credential> {
        let _guard = self.lock.lock().await;
        let mut credential = self.load().await?;
        credential.merge(patch);
        self.persist(&credential).await?;
        Ok(credential)
    }

    pub async fn has(&self, field: CredentialField) -> Res<bool> {
        Ok(self.read().await?.has(field))
    }

    pub async fn clear(&self, field: CredentialField) -> Res<()> {
        let _guard = self.lock.lock().await;
        let mut credential = self.load().await?;
        credential.clear(field);
        self.persist(&credential).await
    }

    async fn load(&self) -> Res<Credential> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No credential record yet");
                return Ok(Credential::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Ok(credential),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Credential record is unreadable, reinitializing it"
                );
                let empty = Credential::default();
                self.persist(&empty).await?;
                Ok(empty)
            }
        }
    }

    async fn persist(&self, credential: &Credential) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(credential)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        restrict_permissions(&tmp).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Res<()> {
    use std::os::unix::fs::PermissionsExt;
    async_fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Res<()> {
    Ok(())
}
