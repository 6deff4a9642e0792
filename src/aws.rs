//! Thin runner for the AWS CLI
//!
//! Every remote call the default collaborators make goes through here so
//! profile/region handling and credential error detection live in one place.

use crate::config::schema::AwsConfig;
use crate::error::{StagerError, StagerResult};
use serde::de::DeserializeOwned;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Failure text fragments the CLI prints for absent resources
const NOT_FOUND_MARKERS: &[&str] = &["NotFoundException", "NoSuchKey", "Not Found", "(404)"];

/// AWS CLI invocation settings
#[derive(Debug, Clone, Default)]
pub struct AwsCli {
    profile: Option<String>,
    region: Option<String>,
}

impl AwsCli {
    /// Create a runner from config
    pub fn new(config: &AwsConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            region: config.region.clone(),
        }
    }

    /// Override the region used for every call
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Full argument list for a call, including global flags
    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full: Vec<&str> = args.to_vec();
        full.extend(["--output", "json"]);
        if let Some(profile) = &self.profile {
            full.extend(["--profile", profile.as_str()]);
        }
        if let Some(region) = &self.region {
            full.extend(["--region", region.as_str()]);
        }
        full
    }

    /// Run `aws <args>` and return the raw output
    pub async fn exec(&self, args: &[&str]) -> StagerResult<Output> {
        let full = self.args(args);
        debug!("Executing: aws {}", full.join(" "));

        Command::new("aws")
            .args(&full)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StagerError::command_failed(format!("aws {}", args.join(" ")), e))
    }

    /// Run `aws <args>` and parse stdout as JSON
    ///
    /// `on_failure` turns the CLI's stderr into the caller's domain error.
    pub async fn exec_json<T, F>(&self, args: &[&str], on_failure: F) -> StagerResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(String) -> StagerError,
    {
        let output = self.exec(args).await?;
        if !output.status.success() {
            return Err(failure(&output, on_failure));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Stderr of a finished command as text
pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Whether the CLI reported the target resource as absent
pub fn is_not_found(stderr: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// Map a failed CLI call to an error, surfacing missing credentials first
pub fn failure<F>(output: &Output, on_failure: F) -> StagerError
where
    F: FnOnce(String) -> StagerError,
{
    let stderr = stderr_text(output);
    if is_credentials_error(&stderr) {
        return StagerError::AwsNotConfigured;
    }
    on_failure(stderr)
}

/// Missing credentials or an unknown `--profile`
fn is_credentials_error(stderr: &str) -> bool {
    stderr.contains("Unable to locate credentials")
        || (stderr.contains("The config profile") && stderr.contains("could not be found"))
}
