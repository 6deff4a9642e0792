//! Importer-process applier
//!
//! Runs the cached importer jar against an API:
//! `java -jar <importer> --update <api_id> --region <region> <definition>`

use crate::applier::{output_tail, stream_child_output, ArtifactApplier, DefinitionSource};
use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Applier that shells out to the importer tool
pub struct ImporterApplier {
    java: String,
    importer: PathBuf,
}

impl ImporterApplier {
    /// Create an applier running `importer` with the given java executable
    pub fn new(java: impl Into<String>, importer: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            importer: importer.into(),
        }
    }

    fn args(&self, api_id: &str, region: &str, definition: &DefinitionSource) -> Vec<String> {
        vec![
            "-jar".to_string(),
            self.importer.display().to_string(),
            "--update".to_string(),
            api_id.to_string(),
            "--region".to_string(),
            region.to_string(),
            definition.path().display().to_string(),
        ]
    }
}

#[async_trait]
impl ArtifactApplier for ImporterApplier {
    async fn apply(
        &self,
        api_id: &str,
        region: &str,
        definition: &DefinitionSource,
    ) -> StagerResult<()> {
        let args = self.args(api_id, region, definition);
        let command = format!("{} {}", self.java, args.join(" "));
        info!("Importing {} into API {}", definition.path().display(), api_id);
        debug!("Executing: {}", command);

        let mut child = Command::new(&self.java)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StagerError::command_failed(command.clone(), e))?;

        let output =
            stream_child_output(&mut child, &|line: &str| debug!("importer: {}", line)).await?;

        let status = child
            .wait()
            .await
            .map_err(|e| StagerError::command_failed(command, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(StagerError::Apply {
                api_id: api_id.to_string(),
                reason: format!("importer exited with {}\n{}", status, output_tail(&output)),
            })
        }
    }

    fn name(&self) -> &'static str {
        "importer"
    }
}
