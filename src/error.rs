//! Error types for Stager
//!
//! All modules use `StagerResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stager operations
pub type StagerResult<T> = Result<T, StagerError>;

/// All errors that can occur in Stager
#[derive(Error, Debug)]
pub enum StagerError {
    // Reconciliation errors
    #[error("Failed to resolve API {name}: {reason}")]
    Resolution { name: String, reason: String },

    #[error("Failed to apply definition to API {api_id}: {reason}")]
    Apply { api_id: String, reason: String },

    #[error("Stage {stage} on API {api_id} failed: {reason}")]
    Stage {
        api_id: String,
        stage: String,
        reason: String,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Definition file not found: {0}")]
    DefinitionNotFound(PathBuf),

    #[error("No AWS region given. Pass --region, set AWS_REGION or [aws].region")]
    RegionMissing,

    // Artifact errors
    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Object store request for {location} failed: {reason}")]
    ObjectStore { location: String, reason: String },

    #[error("Importer artifact not configured. Set [artifact].bucket and [artifact].key")]
    ArtifactNotConfigured,

    // Environment errors
    #[error("AWS credentials not configured. Run: aws configure")]
    AwsNotConfigured,

    #[error("Required CLI not found: {name}. {hint}")]
    CliNotFound { name: String, hint: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StagerError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error, recognising a missing executable
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        let command = command.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            let hint = match name.as_str() {
                "aws" => "Install the AWS CLI: https://aws.amazon.com/cli/",
                "java" => "Install a Java runtime or set [apply].java",
                _ => "Check that it is installed and on PATH",
            };
            return Self::CliNotFound {
                name,
                hint: hint.to_string(),
            };
        }
        Self::CommandFailed { command, source }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AwsNotConfigured => Some("Run: aws configure"),
            Self::RegionMissing => Some("Example: stager setup MyApi staging --region us-east-1 ..."),
            Self::ArtifactNotConfigured => {
                Some("Or switch to the direct applier: stager config init, then set [apply].mode = \"direct\"")
            }
            Self::Resolution { .. } => {
                Some("API names must be unique; remove or rename the duplicate APIs")
            }
            _ => None,
        }
    }
}
