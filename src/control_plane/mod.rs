//! API management control plane abstraction
//!
//! The reconciler only talks to the remote service through
//! [`ApiControlPlane`], so tests can swap in an in-memory double.

mod api_gateway;

pub use api_gateway::AwsCliControlPlane;

use crate::error::StagerResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named API known to the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    /// Identifier assigned by the control plane
    pub id: String,
    /// Human-chosen name
    pub name: String,
    /// Set at creation, never updated
    #[serde(default)]
    pub description: Option<String>,
}

/// One environment's published deployment of an API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub api_id: String,
    /// Environment name, doubling as the stage identifier
    pub env_name: String,
    pub description: String,
    pub variables: BTreeMap<String, String>,
    /// Deployment backing the stage, when the control plane reports one
    pub deployment_id: Option<String>,
}

/// Result of a stage deletion; absence is not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Remote API-management service
#[async_trait]
pub trait ApiControlPlane: Send + Sync {
    /// All APIs whose name equals `name` exactly
    async fn list_apis_by_name(&self, name: &str) -> StagerResult<Vec<ApiResource>>;

    /// Create a new API and return it with its assigned id
    async fn create_api(&self, name: &str, description: &str) -> StagerResult<ApiResource>;

    /// Deploy the API to `env_name`, replacing any existing stage of that name
    async fn create_or_replace_stage(
        &self,
        api_id: &str,
        env_name: &str,
        description: &str,
        variables: &BTreeMap<String, String>,
    ) -> StagerResult<Stage>;

    /// Delete the stage; a missing stage yields [`DeleteOutcome::NotFound`]
    async fn delete_stage(&self, api_id: &str, env_name: &str) -> StagerResult<DeleteOutcome>;
}
