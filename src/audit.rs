//! Audit trail of remote state changes
//!
//! Each change stager makes to API Gateway or to the artifact cache is
//! appended as one JSON line (`timestamp`, `event`, `data`) to
//! `<state_dir>/stager/audit.log`.

use crate::artifact::{CachedArtifact, RemoteLocation};
use crate::config::{schema::Config, ConfigManager};
use crate::control_plane::ApiResource;
use crate::reconcile::{SetupOutcome, SetupRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// A recorded state change
#[derive(Debug, Clone, Copy)]
pub enum AuditEvent<'a> {
    /// `setup` created the API
    ApiCreated {
        api: &'a ApiResource,
        region: &'a str,
    },
    /// `setup` published a stage
    StageDeployed {
        request: &'a SetupRequest,
        outcome: &'a SetupOutcome,
    },
    /// `shutdown` removed a stage
    StageDeleted {
        api_name: &'a str,
        env_name: &'a str,
        region: &'a str,
    },
    /// A new importer version landed in the cache
    ArtifactSynced {
        remote: &'a RemoteLocation,
        artifact: &'a CachedArtifact,
    },
}

impl AuditEvent<'_> {
    /// Dotted event name written to the log
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiCreated { .. } => "api.created",
            Self::StageDeployed { .. } => "stage.deployed",
            Self::StageDeleted { .. } => "stage.deleted",
            Self::ArtifactSynced { .. } => "artifact.synced",
        }
    }

    /// Event payload
    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::ApiCreated { api, region } => json!({
                "name": api.name,
                "id": api.id,
                "region": region,
            }),
            Self::StageDeployed { request, outcome } => json!({
                "api": request.api_name,
                "api_id": outcome.api.id,
                "stage": outcome.stage.env_name,
                "region": request.region,
                "definition": request.definition.path(),
                "deployment_id": outcome.stage.deployment_id,
                "variables": outcome.stage.variables,
                "endpoint": outcome.endpoint_url,
            }),
            Self::StageDeleted {
                api_name,
                env_name,
                region,
            } => json!({
                "api": api_name,
                "stage": env_name,
                "region": region,
            }),
            Self::ArtifactSynced { remote, artifact } => json!({
                "remote": remote.to_string(),
                "path": artifact.local_path,
                "version": artifact.synced_version,
            }),
        }
    }
}

#[derive(Serialize)]
struct AuditEntry {
    timestamp: DateTime<Utc>,
    event: &'static str,
    data: serde_json::Value,
}

impl AuditEntry {
    fn of(event: &AuditEvent<'_>) -> Self {
        Self {
            timestamp: Utc::now(),
            event: event.name(),
            data: event.data(),
        }
    }
}

/// Append-only audit log; a no-op when `general.audit_log` is off
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config
                .general
                .audit_log
                .then(ConfigManager::audit_log_path),
        }
    }

    /// Append `event`
    ///
    /// Failures are logged and dropped; the remote change already happened.
    pub async fn record(&self, event: AuditEvent<'_>) {
        let Some(path) = &self.path else {
            return;
        };

        let line = match serde_json::to_string(&AuditEntry::of(&event)) {
            Ok(line) => line + "\n",
            Err(e) => {
                warn!("Failed to serialize audit event {}: {}", event.name(), e);
                return;
            }
        };

        if let Err(e) = append(path, &line).await {
            warn!("Failed to write audit log {}: {}", path.display(), e);
        }
    }
}

async fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}
