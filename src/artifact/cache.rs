//! Version-keyed synchronization of a single cached artifact

use crate::artifact::{
    CachedArtifact, LocalTarget, ObjectStore, RemoteLocation, VersionPointer,
};
use crate::error::{StagerError, StagerResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Keeps one local copy of a remote artifact current
pub struct ArtifactCache {
    store: Arc<dyn ObjectStore>,
    pointer: Arc<dyn VersionPointer>,
}

impl ArtifactCache {
    pub fn new(store: Arc<dyn ObjectStore>, pointer: Arc<dyn VersionPointer>) -> Self {
        Self { store, pointer }
    }

    /// Version recorded for `target`, if any
    pub async fn synced_version(&self, target: &LocalTarget) -> Option<String> {
        self.pointer.read(target).await
    }

    /// Make sure `target` holds the remote's current version
    ///
    /// Downloads when the recorded version differs from the remote one or
    /// the local file is missing. The version is recorded only after the
    /// file is in place.
    pub async fn ensure_current(
        &self,
        remote: &RemoteLocation,
        target: &LocalTarget,
    ) -> StagerResult<CachedArtifact> {
        let synced = self.pointer.read(target).await;
        let current = self.store.head(remote).await?;
        let present = fs::try_exists(&target.path).await.unwrap_or(false);

        if present && synced.as_deref() == Some(current.as_str()) {
            debug!("{} is current at version {}", target.path.display(), current);
            return Ok(CachedArtifact {
                local_path: target.path.clone(),
                synced_version: current,
                downloaded: false,
            });
        }

        match (&synced, present) {
            (Some(_), false) => info!("Cached {} missing, downloading again", target.path.display()),
            (Some(old), true) => info!("Updating {} from version {} to {}", remote, old, current),
            (None, _) => info!("Downloading {} (version {})", remote, current),
        }

        self.download(remote, &current, target).await?;
        self.pointer.write(target, &current).await?;

        Ok(CachedArtifact {
            local_path: target.path.clone(),
            synced_version: current,
            downloaded: true,
        })
    }

    /// Fetch `version` into a sibling `.part` file, then move it over the target
    ///
    /// The `.part` file is created before the store is contacted, so a
    /// local write failure is `Io`, never a store error.
    async fn download(
        &self,
        remote: &RemoteLocation,
        version: &str,
        target: &LocalTarget,
    ) -> StagerResult<()> {
        if let Some(parent) = target.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StagerError::io(format!("creating artifact directory {}", parent.display()), e)
            })?;
        }

        let part = part_path(&target.path);
        fs::File::create(&part)
            .await
            .map_err(|e| StagerError::io(format!("creating {}", part.display()), e))?;
        self.store.get(remote, version, &part).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o755);
            fs::set_permissions(&part, perms)
                .await
                .map_err(|e| StagerError::io("setting artifact permissions", e))?;
        }

        fs::rename(&part, &target.path).await.map_err(|e| {
            StagerError::io(format!("moving artifact into {}", target.path.display()), e)
        })
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut part = path.to_path_buf().into_os_string();
    part.push(".part");
    PathBuf::from(part)
}
