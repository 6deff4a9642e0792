//! CLI command implementations

pub mod artifact;
pub mod config;
pub mod endpoint;
pub mod setup;
pub mod shutdown;

pub use artifact::execute as artifact;
pub use config::execute as config;
pub use endpoint::execute as endpoint;
pub use setup::execute as setup;
pub use shutdown::execute as shutdown;

use crate::aws::AwsCli;
use crate::config::Config;
use crate::control_plane::AwsCliControlPlane;
use crate::error::{StagerError, StagerResult};
use crate::reconcile::ApiReconciler;
use std::sync::Arc;

/// Region from the command line (or AWS_REGION), else from config
fn resolve_region(arg: Option<String>, config: &Config) -> StagerResult<String> {
    arg.or_else(|| config.aws.region.clone())
        .filter(|region| !region.trim().is_empty())
        .ok_or(StagerError::RegionMissing)
}

/// Reconciler talking to API Gateway in `region`
fn reconciler(config: &Config, aws: &AwsCli) -> ApiReconciler {
    ApiReconciler::new(Arc::new(AwsCliControlPlane::new(aws.clone())))
        .with_provider_domain(config.aws.provider_domain.as_str())
}
