//! Endpoint command - print a stage's URL without deploying

use crate::aws::AwsCli;
use crate::cli::args::EndpointArgs;
use crate::cli::commands::{reconciler, resolve_region};
use crate::config::Config;
use crate::error::{StagerError, StagerResult};

/// Execute the endpoint command
pub async fn execute(args: EndpointArgs, config: &Config) -> StagerResult<()> {
    let region = resolve_region(args.region, config)?;
    let aws = AwsCli::new(&config.aws).with_region(region.as_str());
    let reconciler = reconciler(config, &aws);

    let api = reconciler
        .resolve(&args.api)
        .await?
        .ok_or_else(|| StagerError::Resolution {
            name: args.api.clone(),
            reason: "no API with this name exists".to_string(),
        })?;

    println!("{}", reconciler.endpoint_url(&api.id, &region, &args.env));
    Ok(())
}
