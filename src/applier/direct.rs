//! Direct applier using `aws apigateway put-rest-api`

use crate::applier::{ArtifactApplier, DefinitionSource};
use crate::aws::{self, AwsCli};
use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use tracing::info;

/// Applier that overwrites the API from the definition in one call
pub struct DirectApplier {
    aws: AwsCli,
}

impl DirectApplier {
    /// Create a direct applier using the given CLI settings
    pub fn new(aws: AwsCli) -> Self {
        Self { aws }
    }
}

fn body_arg(definition: &DefinitionSource) -> String {
    format!("fileb://{}", definition.path().display())
}

#[async_trait]
impl ArtifactApplier for DirectApplier {
    async fn apply(
        &self,
        api_id: &str,
        region: &str,
        definition: &DefinitionSource,
    ) -> StagerResult<()> {
        info!("Overwriting API {} from {}", api_id, definition.path().display());

        let body = body_arg(definition);
        let output = self
            .aws
            .clone()
            .with_region(region)
            .exec(&[
                "apigateway",
                "put-rest-api",
                "--rest-api-id",
                api_id,
                "--mode",
                "overwrite",
                "--body",
                body.as_str(),
            ])
            .await?;

        if output.status.success() {
            return Ok(());
        }

        Err(aws::failure(&output, |reason| StagerError::Apply {
            api_id: api_id.to_string(),
            reason,
        }))
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn body_uses_binary_file_prefix() {
        let dir = TempDir::new().unwrap();
        let swagger = dir.path().join("swagger.yaml");
        std::fs::write(&swagger, "swagger: '2.0'").unwrap();
        let definition = DefinitionSource::from_path(&swagger).unwrap();

        let body = body_arg(&definition);
        assert!(body.starts_with("fileb://"));
        assert!(body.ends_with("swagger.yaml"));
    }
}
