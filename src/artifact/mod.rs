//! Local cache of the remotely published importer tool
//!
//! The cached copy is keyed by the remote object's version identifier:
//! a download happens only when the remote version differs from the one
//! recorded next to the local file, or the local file is gone.
//!
//! # Cache States
//!
//! | Pointer | File | Action |
//! |---------|------|--------|
//! | absent | any | download |
//! | differs from remote | any | download |
//! | matches remote | missing | download (repair) |
//! | matches remote | present | none |

mod cache;
mod pointer;
mod store;

pub use cache::ArtifactCache;
pub use pointer::{FileVersionPointer, VersionPointer};
pub use store::{HttpObjectStore, ObjectStore, S3CliObjectStore};

use crate::aws::AwsCli;
use crate::config::schema::{ArtifactConfig, ArtifactSource};
use crate::config::ConfigManager;
use crate::error::{StagerError, StagerResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bucket/key address of a remote object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteLocation {
    pub bucket: String,
    pub key: String,
}

impl RemoteLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// File name component of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// First 12 hex chars of the SHA-256 of `bucket/key`
    pub fn short_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.bucket.as_bytes());
        hasher.update(b"/");
        hasher.update(self.key.as_bytes());
        hex::encode(&hasher.finalize()[..6])
    }

    pub(crate) fn not_found(&self) -> StagerError {
        StagerError::ObjectNotFound {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
        }
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Where a remote object is materialized locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTarget {
    pub path: PathBuf,
}

impl LocalTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default target for `remote` inside `dir`, unique per bucket/key
    pub fn for_remote(dir: &Path, remote: &RemoteLocation) -> Self {
        let name = format!("{}-{}", remote.short_hash(), remote.file_name());
        Self::new(dir.join(name))
    }
}

/// The locally materialized copy of a remote object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedArtifact {
    pub local_path: PathBuf,
    /// Remote version the local file corresponds to
    pub synced_version: String,
    /// Whether this call downloaded the file
    pub downloaded: bool,
}

/// Remote and local locations of the importer from config
pub fn artifact_location(config: &ArtifactConfig) -> StagerResult<(RemoteLocation, LocalTarget)> {
    let (Some(bucket), Some(key)) = (&config.bucket, &config.key) else {
        return Err(StagerError::ArtifactNotConfigured);
    };

    let remote = RemoteLocation::new(bucket.as_str(), key.as_str());
    let dir = config
        .cache_dir
        .clone()
        .unwrap_or_else(ConfigManager::artifacts_dir);
    let target = LocalTarget::for_remote(&dir, &remote);
    Ok((remote, target))
}

/// Create the object store selected by `[artifact].source`
pub fn create_object_store(config: &ArtifactConfig, aws: AwsCli) -> Arc<dyn ObjectStore> {
    match config.source {
        ArtifactSource::S3 => Arc::new(S3CliObjectStore::new(aws)),
        ArtifactSource::Http => Arc::new(HttpObjectStore::new(config.http_base_url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_location_display() {
        let remote = RemoteLocation::new("tools", "importer/aws-apigateway-importer.jar");
        assert_eq!(
            remote.to_string(),
            "s3://tools/importer/aws-apigateway-importer.jar"
        );
        assert_eq!(remote.file_name(), "aws-apigateway-importer.jar");
    }

    #[test]
    fn short_hash_is_stable_and_distinct() {
        let a = RemoteLocation::new("tools", "importer.jar");
        let b = RemoteLocation::new("tools", "other.jar");
        assert_eq!(a.short_hash(), a.short_hash());
        assert_eq!(a.short_hash().len(), 12);
        assert_ne!(a.short_hash(), b.short_hash());
    }

    #[test]
    fn default_target_in_cache_dir() {
        let remote = RemoteLocation::new("tools", "importer/importer.jar");
        let target = LocalTarget::for_remote(Path::new("/cache"), &remote);
        let name = target.path.file_name().unwrap().to_string_lossy().to_string();
        assert!(target.path.starts_with("/cache"));
        assert_eq!(name, format!("{}-importer.jar", remote.short_hash()));
    }

    #[test]
    fn artifact_location_requires_bucket_and_key() {
        let config = ArtifactConfig {
            bucket: Some("tools".to_string()),
            ..ArtifactConfig::default()
        };
        assert!(matches!(
            artifact_location(&config),
            Err(StagerError::ArtifactNotConfigured)
        ));
    }

    #[test]
    fn artifact_location_uses_configured_dir() {
        let config = ArtifactConfig {
            bucket: Some("tools".to_string()),
            key: Some("importer.jar".to_string()),
            cache_dir: Some(PathBuf::from("/var/cache/stager")),
            ..ArtifactConfig::default()
        };
        let (remote, target) = artifact_location(&config).unwrap();
        assert_eq!(remote.bucket, "tools");
        assert!(target.path.starts_with("/var/cache/stager"));
    }
}
