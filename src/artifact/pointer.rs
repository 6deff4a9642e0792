//! Persisted "last synced version" of a cached artifact

use crate::artifact::LocalTarget;
use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Local slot holding the version a cached file was downloaded at
#[async_trait]
pub trait VersionPointer: Send + Sync {
    /// Stored version, `None` when never synced or unreadable
    async fn read(&self, target: &LocalTarget) -> Option<String>;

    /// Store `version`; durable once this returns
    async fn write(&self, target: &LocalTarget, version: &str) -> StagerResult<()>;
}

/// Pointer kept in a `<file>.version` sidecar next to the artifact
#[derive(Debug, Clone, Copy, Default)]
pub struct FileVersionPointer;

impl FileVersionPointer {
    pub fn new() -> Self {
        Self
    }

    /// Sidecar path for `target`
    pub fn sidecar(target: &LocalTarget) -> PathBuf {
        let mut path = target.path.clone().into_os_string();
        path.push(".version");
        PathBuf::from(path)
    }
}

#[async_trait]
impl VersionPointer for FileVersionPointer {
    async fn read(&self, target: &LocalTarget) -> Option<String> {
        let path = Self::sidecar(target);
        match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(version) => Some(version),
                Err(_) => {
                    warn!("Ignoring non-UTF-8 version file {}", path.display());
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No version file at {}", path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable version file {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn write(&self, target: &LocalTarget, version: &str) -> StagerResult<()> {
        let path = Self::sidecar(target);
        let context = || format!("writing version file {}", path.display());

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StagerError::io(context(), e))?;
        file.write_all(version.as_bytes())
            .await
            .map_err(|e| StagerError::io(context(), e))?;
        file.sync_all()
            .await
            .map_err(|e| StagerError::io(context(), e))?;

        debug!("Recorded version {} in {}", version, path.display());
        Ok(())
    }
}
