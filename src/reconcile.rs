//! API lifecycle reconciliation
//!
//! Converges a named API and one of its stages onto the desired state:
//! resolve-or-create the API by name, apply a definition, then publish
//! (or tear down) the stage for an environment.
//!
//! Resolve-then-create is not atomic. Callers must serialize `setup` and
//! `shutdown` per API name, otherwise two APIs with the same name can be
//! created.

use crate::applier::{ArtifactApplier, DefinitionSource};
use crate::control_plane::{ApiControlPlane, ApiResource, DeleteOutcome, Stage};
use crate::error::{StagerError, StagerResult};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Stage variable always set to the environment name
pub const ENVIRONMENT_VARIABLE: &str = "environment";

/// Default domain of generated endpoint URLs
pub const DEFAULT_PROVIDER_DOMAIN: &str = "amazonaws.com";

const MAX_STAGE_NAME_LEN: usize = 128;

/// Desired state for one environment of an API
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub api_name: String,
    pub env_name: String,
    pub definition: DefinitionSource,
    /// Used only when the API has to be created
    pub description: String,
    /// Extra stage variables; `environment` is always overwritten
    pub variables: BTreeMap<String, String>,
    pub region: String,
}

/// What `setup` converged to
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    pub api: ApiResource,
    /// True when this call created the API
    pub api_created: bool,
    pub stage: Stage,
    pub endpoint_url: String,
}

/// What `shutdown` found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    StageDeleted,
    StageNotFound,
    ApiNotFound,
}

/// Owns the lifecycle of named APIs across environments
pub struct ApiReconciler {
    control_plane: Arc<dyn ApiControlPlane>,
    provider_domain: String,
}

impl ApiReconciler {
    pub fn new(control_plane: Arc<dyn ApiControlPlane>) -> Self {
        Self {
            control_plane,
            provider_domain: DEFAULT_PROVIDER_DOMAIN.to_string(),
        }
    }

    /// Use a different domain suffix for endpoint URLs
    pub fn with_provider_domain(mut self, domain: impl Into<String>) -> Self {
        self.provider_domain = domain.into();
        self
    }

    /// Public invoke URL of a stage
    pub fn endpoint_url(&self, api_id: &str, region: &str, env_name: &str) -> String {
        format!(
            "https://{}.execute-api.{}.{}/{}/",
            api_id, region, self.provider_domain, env_name
        )
    }

    /// Look up the API called `api_name`; more than one match is an error
    pub async fn resolve(&self, api_name: &str) -> StagerResult<Option<ApiResource>> {
        let mut matches = self.control_plane.list_apis_by_name(api_name).await?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => {
                let ids: Vec<&str> = matches.iter().map(|api| api.id.as_str()).collect();
                Err(StagerError::Resolution {
                    name: api_name.to_string(),
                    reason: format!("{} APIs share this name ({})", n, ids.join(", ")),
                })
            }
        }
    }

    async fn resolve_or_create(
        &self,
        api_name: &str,
        description: &str,
    ) -> StagerResult<(ApiResource, bool)> {
        if let Some(api) = self.resolve(api_name).await? {
            debug!("Resolved API {} to {}", api_name, api.id);
            return Ok((api, false));
        }

        info!("API {} not found, creating it", api_name);
        let api = self.control_plane.create_api(api_name, description).await?;
        Ok((api, true))
    }

    /// Create or update the API, apply the definition with `applier` and
    /// publish it as stage `env_name`
    ///
    /// A failed apply leaves the stage untouched.
    pub async fn setup(
        &self,
        applier: &dyn ArtifactApplier,
        request: &SetupRequest,
    ) -> StagerResult<SetupOutcome> {
        validate_api_name(&request.api_name)?;
        validate_stage_name(&request.env_name)?;

        let (api, api_created) = self
            .resolve_or_create(&request.api_name, &request.description)
            .await?;

        applier
            .apply(&api.id, &request.region, &request.definition)
            .await?;

        let variables = stage_variables(&request.variables, &request.env_name);
        let description = stage_description(&request.api_name, &request.env_name);
        let stage = self
            .control_plane
            .create_or_replace_stage(&api.id, &request.env_name, &description, &variables)
            .await?;

        let endpoint_url = self.endpoint_url(&api.id, &request.region, &request.env_name);
        info!("Stage {} of {} live at {}", request.env_name, request.api_name, endpoint_url);

        Ok(SetupOutcome {
            api,
            api_created,
            stage,
            endpoint_url,
        })
    }

    /// Remove stage `env_name`; absent API or stage counts as success
    pub async fn shutdown(&self, api_name: &str, env_name: &str) -> StagerResult<ShutdownOutcome> {
        validate_api_name(api_name)?;
        validate_stage_name(env_name)?;

        let Some(api) = self.resolve(api_name).await? else {
            info!("API {} does not exist, nothing to shut down", api_name);
            return Ok(ShutdownOutcome::ApiNotFound);
        };

        match self.control_plane.delete_stage(&api.id, env_name).await? {
            DeleteOutcome::Deleted => {
                info!("Deleted stage {} of {}", env_name, api_name);
                Ok(ShutdownOutcome::StageDeleted)
            }
            DeleteOutcome::NotFound => {
                info!("Stage {} of {} already absent", env_name, api_name);
                Ok(ShutdownOutcome::StageNotFound)
            }
        }
    }
}

/// Caller variables with `environment` forced to the stage name
fn stage_variables(
    variables: &BTreeMap<String, String>,
    env_name: &str,
) -> BTreeMap<String, String> {
    let mut variables = variables.clone();
    variables.insert(ENVIRONMENT_VARIABLE.to_string(), env_name.to_string());
    variables
}

fn stage_description(api_name: &str, env_name: &str) -> String {
    format!(
        "{} deployment of {} at {}",
        env_name,
        api_name,
        Utc::now().to_rfc3339()
    )
}

fn validate_api_name(name: &str) -> StagerResult<()> {
    if name.trim().is_empty() {
        return Err(StagerError::InvalidInput {
            field: "API name",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Stage names: 1-128 ASCII alphanumerics, hyphens or underscores
fn validate_stage_name(name: &str) -> StagerResult<()> {
    let reason = if name.is_empty() {
        "must not be empty".to_string()
    } else if name.len() > MAX_STAGE_NAME_LEN {
        format!("longer than {MAX_STAGE_NAME_LEN} characters")
    } else if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        format!("'{name}' contains '{c}'; use letters, digits, '-' or '_'")
    } else {
        return Ok(());
    };

    Err(StagerError::InvalidInput {
        field: "environment name",
        reason,
    })
}
