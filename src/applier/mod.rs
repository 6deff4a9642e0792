//! Definition appliers
//!
//! Materialize a swagger definition into the routes of an existing API:
//! - `ImporterApplier`: runs the downloaded importer tool
//! - `DirectApplier`: calls `put-rest-api` through the AWS CLI

mod direct;
mod factory;
mod importer;

pub use direct::DirectApplier;
pub use factory::create_applier;
pub use importer::ImporterApplier;

use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines kept in apply error messages.
const APPLY_ERROR_TAIL_LINES: usize = 50;

/// Handle to a definition document; its format is opaque here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSource {
    path: PathBuf,
}

impl DefinitionSource {
    /// Wrap an existing definition file
    pub fn from_path(path: impl Into<PathBuf>) -> StagerResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(StagerError::DefinitionNotFound(path));
        }
        Ok(Self { path })
    }

    /// Location of the document on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Applies a definition to an API; success or failure, nothing in between
#[async_trait]
pub trait ArtifactApplier: Send + Sync {
    /// Apply `definition` to the API `api_id` in `region`
    async fn apply(
        &self,
        api_id: &str,
        region: &str,
        definition: &DefinitionSource,
    ) -> StagerResult<()>;

    /// Human-readable applier name for display
    fn name(&self) -> &'static str;
}

/// Last `APPLY_ERROR_TAIL_LINES` lines of collected output.
pub(crate) fn output_tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(APPLY_ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns all collected output lines for error reporting.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(&str) + Send + Sync),
) -> StagerResult<Vec<String>> {
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| StagerError::Internal("child stderr not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| StagerError::Internal("child stdout not piped".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_reader = BufReader::new(stdout).lines();

    let mut all_output = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.as_str());
                        all_output.push(line);
                    }
                    _ => stderr_done = true,
                }
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.as_str());
                        all_output.push(line);
                    }
                    _ => stdout_done = true,
                }
            }
        }
    }

    Ok(all_output)
}
