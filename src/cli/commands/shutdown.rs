//! Shutdown command - remove an environment's stage

use crate::audit::{AuditEvent, AuditLog};
use crate::aws::AwsCli;
use crate::cli::args::ShutdownArgs;
use crate::cli::commands::{reconciler, resolve_region};
use crate::cli::progress::spinner;
use crate::config::Config;
use crate::error::StagerResult;
use crate::reconcile::ShutdownOutcome;
use console::style;

/// Execute the shutdown command
pub async fn execute(args: ShutdownArgs, config: &Config) -> StagerResult<()> {
    let region = resolve_region(args.region, config)?;
    let aws = AwsCli::new(&config.aws).with_region(region.as_str());

    let pb = spinner(format!("Shutting down {} of {}...", args.env, args.api));
    let result = reconciler(config, &aws).shutdown(&args.api, &args.env).await;
    pb.finish_and_clear();

    match result? {
        ShutdownOutcome::StageDeleted => {
            AuditLog::new(config)
                .record(AuditEvent::StageDeleted {
                    api_name: &args.api,
                    env_name: &args.env,
                    region: &region,
                })
                .await;
            println!(
                "{} Stage {} of {} deleted",
                style("✓").green(),
                style(&args.env).cyan(),
                style(&args.api).cyan()
            );
        }
        ShutdownOutcome::StageNotFound => {
            println!(
                "{} Stage {} of {} does not exist",
                style("!").yellow(),
                style(&args.env).cyan(),
                style(&args.api).cyan()
            );
        }
        ShutdownOutcome::ApiNotFound => {
            println!(
                "{} API {} does not exist",
                style("!").yellow(),
                style(&args.api).cyan()
            );
        }
    }

    Ok(())
}
