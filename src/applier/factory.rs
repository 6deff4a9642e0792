//! Applier factory
//!
//! Picks the applier variant configured in `[apply].mode`.

use crate::applier::{ArtifactApplier, DirectApplier, ImporterApplier};
use crate::artifact::CachedArtifact;
use crate::aws::AwsCli;
use crate::config::schema::{ApplyConfig, ApplyMode};
use crate::error::{StagerError, StagerResult};
use std::sync::Arc;

/// Create the configured applier
///
/// # Arguments
/// * `config` - The `[apply]` settings
/// * `aws` - CLI settings for the direct variant
/// * `importer` - The synced importer, required by the importer variant
pub fn create_applier(
    config: &ApplyConfig,
    aws: &AwsCli,
    importer: Option<&CachedArtifact>,
) -> StagerResult<Arc<dyn ArtifactApplier>> {
    match config.mode {
        ApplyMode::Importer => {
            let importer = importer.ok_or(StagerError::ArtifactNotConfigured)?;
            Ok(Arc::new(ImporterApplier::new(
                config.java.as_str(),
                importer.local_path.as_path(),
            )))
        }
        ApplyMode::Direct => Ok(Arc::new(DirectApplier::new(aws.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn direct_mode_needs_no_artifact() {
        let config = ApplyConfig {
            mode: ApplyMode::Direct,
            ..ApplyConfig::default()
        };
        let applier = create_applier(&config, &AwsCli::default(), None).unwrap();
        assert_eq!(applier.name(), "direct");
    }

    #[test]
    fn importer_mode_requires_artifact() {
        let config = ApplyConfig::default();
        assert!(matches!(
            create_applier(&config, &AwsCli::default(), None),
            Err(StagerError::ArtifactNotConfigured)
        ));

        let artifact = CachedArtifact {
            local_path: PathBuf::from("/cache/importer.jar"),
            synced_version: "v1".to_string(),
            downloaded: false,
        };
        let applier = create_applier(&config, &AwsCli::default(), Some(&artifact)).unwrap();
        assert_eq!(applier.name(), "importer");
    }
}
