//! Artifact command - sync or inspect the cached importer

use crate::artifact::{
    artifact_location, create_object_store, ArtifactCache, CachedArtifact, FileVersionPointer,
};
use crate::audit::{AuditEvent, AuditLog};
use crate::aws::AwsCli;
use crate::cli::args::{ArtifactAction, ArtifactArgs};
use crate::cli::progress::spinner;
use crate::config::Config;
use crate::error::StagerResult;
use console::style;
use std::sync::Arc;

/// Execute the artifact command
pub async fn execute(args: ArtifactArgs, config: &Config) -> StagerResult<()> {
    match args.action {
        ArtifactAction::Sync => {
            let audit = AuditLog::new(config);
            let artifact = sync(config, &audit).await?;
            let verb = if artifact.downloaded {
                "Downloaded"
            } else {
                "Up to date:"
            };
            println!(
                "{} {} {} (version {})",
                style("✓").green(),
                verb,
                artifact.local_path.display(),
                style(&artifact.synced_version).dim()
            );
            Ok(())
        }
        ArtifactAction::Info => info(config).await,
    }
}

fn cache(config: &Config) -> ArtifactCache {
    let store = create_object_store(&config.artifact, AwsCli::new(&config.aws));
    ArtifactCache::new(store, Arc::new(FileVersionPointer::new()))
}

/// Bring the configured importer up to date
pub(crate) async fn sync(config: &Config, audit: &AuditLog) -> StagerResult<CachedArtifact> {
    let (remote, target) = artifact_location(&config.artifact)?;

    let pb = spinner(format!("Checking {}...", remote));
    let result = cache(config).ensure_current(&remote, &target).await;
    pb.finish_and_clear();
    let artifact = result?;

    if artifact.downloaded {
        audit
            .record(AuditEvent::ArtifactSynced {
                remote: &remote,
                artifact: &artifact,
            })
            .await;
    }

    Ok(artifact)
}

async fn info(config: &Config) -> StagerResult<()> {
    let (remote, target) = artifact_location(&config.artifact)?;
    let synced = cache(config).synced_version(&target).await;
    let present = target.path.exists();

    println!("Remote:  {}", remote);
    println!("Path:    {}", target.path.display());
    println!(
        "Present: {}",
        if present {
            style("yes").green()
        } else {
            style("no").yellow()
        }
    );
    println!(
        "Version: {}",
        synced.as_deref().unwrap_or("(never synced)")
    );
    Ok(())
}
