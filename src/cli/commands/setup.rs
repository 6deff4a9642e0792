//! Setup command - deploy an API definition to an environment

use crate::applier::{create_applier, DefinitionSource};
use crate::audit::{AuditEvent, AuditLog};
use crate::aws::AwsCli;
use crate::cli::args::SetupArgs;
use crate::cli::commands::{artifact, reconciler, resolve_region};
use crate::cli::progress::spinner;
use crate::config::schema::ApplyMode;
use crate::config::Config;
use crate::error::StagerResult;
use crate::reconcile::SetupRequest;
use console::style;
use tracing::debug;

/// Execute the setup command
pub async fn execute(args: SetupArgs, config: &Config) -> StagerResult<()> {
    let region = resolve_region(args.region, config)?;
    let definition = DefinitionSource::from_path(args.definition)?;
    let aws = AwsCli::new(&config.aws).with_region(region.as_str());
    let audit = AuditLog::new(config);

    let importer = match config.apply.mode {
        ApplyMode::Importer => Some(artifact::sync(config, &audit).await?),
        ApplyMode::Direct => None,
    };
    let applier = create_applier(&config.apply, &aws, importer.as_ref())?;
    debug!("Using {} applier", applier.name());

    let request = SetupRequest {
        api_name: args.api,
        env_name: args.env,
        definition,
        description: args.description,
        variables: args.variables.into_iter().collect(),
        region,
    };

    let pb = spinner(format!(
        "Deploying {} to {}...",
        request.api_name, request.env_name
    ));
    let result = reconciler(config, &aws).setup(&*applier, &request).await;
    pb.finish_and_clear();
    let outcome = result?;

    if outcome.api_created {
        audit
            .record(AuditEvent::ApiCreated {
                api: &outcome.api,
                region: &request.region,
            })
            .await;
    }
    audit
        .record(AuditEvent::StageDeployed {
            request: &request,
            outcome: &outcome,
        })
        .await;

    if outcome.api_created {
        println!(
            "{} Created API {} ({})",
            style("✓").green(),
            style(&outcome.api.name).cyan(),
            outcome.api.id
        );
    }
    println!(
        "{} Deployed {} to {}",
        style("✓").green(),
        style(&request.api_name).cyan(),
        style(&request.env_name).cyan()
    );
    println!("{}", outcome.endpoint_url);

    Ok(())
}
