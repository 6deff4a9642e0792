//! Configuration schema for Stager
//!
//! Configuration is stored at `~/.config/stager/config.toml`, optionally
//! overlaid by a project-local `.stager.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// AWS settings shared by the control plane and object store
    pub aws: AwsConfig,

    /// How definitions are applied to an API
    pub apply: ApplyConfig,

    /// Importer artifact location
    pub artifact: ArtifactConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// AWS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// AWS profile to use
    pub profile: Option<String>,

    /// Default region when --region and AWS_REGION are absent
    pub region: Option<String>,

    /// Domain suffix of generated endpoint URLs
    pub provider_domain: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            profile: None,
            region: None,
            provider_domain: "amazonaws.com".to_string(),
        }
    }
}

/// Definition application strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Run the downloaded importer tool
    #[default]
    Importer,
    /// Call put-rest-api directly
    Direct,
}

/// Definition application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Applier variant
    pub mode: ApplyMode,

    /// Java executable used to run the importer
    pub java: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            mode: ApplyMode::Importer,
            java: "java".to_string(),
        }
    }
}

/// Where the importer artifact is fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSource {
    /// `aws s3api` with the configured profile
    #[default]
    S3,
    /// Anonymous HTTPS against the bucket URL
    Http,
}

/// Importer artifact settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Bucket holding the importer
    pub bucket: Option<String>,

    /// Object key of the importer
    pub key: Option<String>,

    /// Transport used to reach the bucket
    pub source: ArtifactSource,

    /// Base URL for the http source (path-style); defaults to the
    /// virtual-hosted S3 URL of the bucket
    pub http_base_url: Option<String>,

    /// Directory holding cached artifacts (default: state dir)
    pub cache_dir: Option<PathBuf>,
}
