//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Stager - deploy swagger-defined APIs to API Gateway stages
///
/// Creates the API on first use, applies the definition and publishes it
/// as a stage named after the environment.
#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STAGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .stager.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update an API and publish it to an environment
    Setup(SetupArgs),

    /// Remove an environment's stage (the API itself is kept)
    Shutdown(ShutdownArgs),

    /// Print the endpoint URL of an environment without deploying
    Endpoint(EndpointArgs),

    /// Manage the cached importer tool
    Artifact(ArtifactArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// API name (created if it does not exist)
    pub api: String,

    /// Environment, used as the stage name
    pub env: String,

    /// Swagger/OpenAPI definition to apply
    #[arg(short, long)]
    pub definition: PathBuf,

    /// Description used when the API is created
    #[arg(long, default_value = "")]
    pub description: String,

    /// Stage variables (KEY=VALUE); `environment` is always the env name
    #[arg(short = 'S', long = "var", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// AWS region
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,
}

/// Arguments for the shutdown command
#[derive(Parser, Debug)]
pub struct ShutdownArgs {
    /// API name
    pub api: String,

    /// Environment whose stage is removed
    pub env: String,

    /// AWS region
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,
}

/// Arguments for the endpoint command
#[derive(Parser, Debug)]
pub struct EndpointArgs {
    /// API name
    pub api: String,

    /// Environment
    pub env: String,

    /// AWS region
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,
}

/// Arguments for the artifact command
#[derive(Parser, Debug)]
pub struct ArtifactArgs {
    /// Subcommand for artifact
    #[command(subcommand)]
    pub action: ArtifactAction,
}

/// Artifact subcommands
#[derive(Subcommand, Debug)]
pub enum ArtifactAction {
    /// Download the importer if the published version changed
    Sync,

    /// Show the cached importer's location and version
    Info,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse a stage variable in KEY=VALUE format
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    if pos == 0 {
        return Err(format!("invalid KEY=VALUE format: empty key in '{s}'"));
    }
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_value_valid() {
        let (k, v) = parse_key_value("backend=orders").unwrap();
        assert_eq!(k, "backend");
        assert_eq!(v, "orders");
    }

    #[test]
    fn parse_key_value_with_equals() {
        let (k, v) = parse_key_value("query=a=b").unwrap();
        assert_eq!(k, "query");
        assert_eq!(v, "a=b");
    }

    #[test]
    fn parse_key_value_invalid() {
        assert!(parse_key_value("backend").is_err());
        assert!(parse_key_value("=orders").is_err());
    }

    #[test]
    fn cli_parses_setup() {
        let cli = Cli::parse_from([
            "stager",
            "setup",
            "OrdersApi",
            "staging",
            "--definition",
            "swagger.json",
            "-S",
            "backend=orders",
            "--var",
            "tier=gold",
            "--region",
            "us-east-1",
        ]);
        match cli.command {
            Commands::Setup(args) => {
                assert_eq!(args.api, "OrdersApi");
                assert_eq!(args.env, "staging");
                assert_eq!(args.definition, PathBuf::from("swagger.json"));
                assert_eq!(args.description, "");
                assert_eq!(args.variables.len(), 2);
                assert_eq!(args.region.as_deref(), Some("us-east-1"));
            }
            _ => panic!("expected Setup command"),
        }
    }

    #[test]
    fn cli_setup_requires_definition() {
        let result = Cli::try_parse_from(["stager", "setup", "OrdersApi", "staging"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_shutdown() {
        let cli = Cli::parse_from(["stager", "shutdown", "OrdersApi", "staging"]);
        match cli.command {
            Commands::Shutdown(args) => {
                assert_eq!(args.api, "OrdersApi");
                assert_eq!(args.env, "staging");
            }
            _ => panic!("expected Shutdown command"),
        }
    }

    #[test]
    fn cli_parses_artifact_sync() {
        let cli = Cli::parse_from(["stager", "artifact", "sync"]);
        match cli.command {
            Commands::Artifact(args) => assert!(matches!(args.action, ArtifactAction::Sync)),
            _ => panic!("expected Artifact command"),
        }
    }

    #[test]
    fn cli_parses_completions() {
        let cli = Cli::parse_from(["stager", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn cli_global_flags() {
        let cli = Cli::parse_from(["stager", "--no-local", "-vv", "config", "path"]);
        assert!(cli.no_local);
        assert_eq!(cli.verbose, 2);
    }
}
