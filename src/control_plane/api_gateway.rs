//! API Gateway control plane backed by the AWS CLI

use crate::aws::{self, AwsCli};
use crate::control_plane::{ApiControlPlane, ApiResource, DeleteOutcome, Stage};
use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// REST API control plane using `aws apigateway`
pub struct AwsCliControlPlane {
    aws: AwsCli,
}

impl AwsCliControlPlane {
    /// Create a control plane using the given CLI settings
    pub fn new(aws: AwsCli) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl ApiControlPlane for AwsCliControlPlane {
    async fn list_apis_by_name(&self, name: &str) -> StagerResult<Vec<ApiResource>> {
        let response: RestApis = self
            .aws
            .exec_json(&["apigateway", "get-rest-apis"], |reason| {
                StagerError::Resolution {
                    name: name.to_string(),
                    reason,
                }
            })
            .await?;

        let matches = response.matching(name);
        debug!("Found {} API(s) named {}", matches.len(), name);
        Ok(matches)
    }

    async fn create_api(&self, name: &str, description: &str) -> StagerResult<ApiResource> {
        let api: ApiResource = self
            .aws
            .exec_json(
                &[
                    "apigateway",
                    "create-rest-api",
                    "--name",
                    name,
                    "--description",
                    description,
                ],
                |reason| StagerError::Resolution {
                    name: name.to_string(),
                    reason: format!("create failed: {reason}"),
                },
            )
            .await?;

        info!("Created API {} ({})", api.name, api.id);
        Ok(api)
    }

    async fn create_or_replace_stage(
        &self,
        api_id: &str,
        env_name: &str,
        description: &str,
        variables: &BTreeMap<String, String>,
    ) -> StagerResult<Stage> {
        let input = serde_json::to_string(&DeploymentInput {
            rest_api_id: api_id,
            stage_name: env_name,
            stage_description: description,
            description,
            variables,
        })?;

        let deployment: Deployment = self
            .aws
            .exec_json(
                &["apigateway", "create-deployment", "--cli-input-json", input.as_str()],
                |reason| StagerError::Stage {
                    api_id: api_id.to_string(),
                    stage: env_name.to_string(),
                    reason,
                },
            )
            .await?;

        debug!("Deployment {} published to stage {}", deployment.id, env_name);
        Ok(Stage {
            api_id: api_id.to_string(),
            env_name: env_name.to_string(),
            description: description.to_string(),
            variables: variables.clone(),
            deployment_id: Some(deployment.id),
        })
    }

    async fn delete_stage(&self, api_id: &str, env_name: &str) -> StagerResult<DeleteOutcome> {
        let output = self
            .aws
            .exec(&[
                "apigateway",
                "delete-stage",
                "--rest-api-id",
                api_id,
                "--stage-name",
                env_name,
            ])
            .await?;

        if output.status.success() {
            return Ok(DeleteOutcome::Deleted);
        }

        if aws::is_not_found(&aws::stderr_text(&output)) {
            return Ok(DeleteOutcome::NotFound);
        }

        Err(aws::failure(&output, |reason| StagerError::Stage {
            api_id: api_id.to_string(),
            stage: env_name.to_string(),
            reason,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct RestApis {
    #[serde(default)]
    items: Vec<ApiResource>,
}

impl RestApis {
    fn matching(self, name: &str) -> Vec<ApiResource> {
        self.items.into_iter().filter(|api| api.name == name).collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentInput<'a> {
    rest_api_id: &'a str,
    stage_name: &'a str,
    stage_description: &'a str,
    description: &'a str,
    variables: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    id: String,
}
