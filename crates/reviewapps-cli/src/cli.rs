//! Argument parsing and command dispatch.

use clap::{Args, Parser, Subcommand};
use reviewapps_core::{DEFAULT_CREDENTIAL_KEY, DEFAULT_PROCESS_TYPE, DEFAULT_QUANTITY};
use reviewapps_telemetry::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, TelemetryError, command_span, init_logging,
};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::apps::{handle_create_app, handle_delete_app, handle_list_apps};
use crate::commands::formation::{handle_list_formation, handle_update_formation};
use crate::config::RuntimeConfig;

pub(crate) const DEFAULT_PLATFORM_URL: &str = "https://api.heroku.com";
pub(crate) const DEFAULT_SOURCE_URL: &str = "https://api.github.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_sha: option_env!("REVIEW_APPS_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err @ TelemetryError::InvalidLevel { .. }) = init_logging(&logging) {
        let err = CliError::validation(err.to_string());
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let result = dispatch(&cli, &trace_id)
        .instrument(command_span(command_name, &trace_id))
        .await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: &Cli, trace_id: &str) -> CliResult<()> {
    let config = RuntimeConfig::from_cli(cli)?;
    let ctx = AppContext::new(config, trace_id)?;

    match &cli.command {
        Command::ListApps(args) => handle_list_apps(&ctx, args).await,
        Command::DeleteApp(args) => handle_delete_app(&ctx, args).await,
        Command::CreateApp(args) => handle_create_app(&ctx, args).await,
        Command::ListFormation(args) => handle_list_formation(&ctx, args).await,
        Command::UpdateFormation(args) => handle_update_formation(&ctx, args).await,
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::ListApps(_) => "list-apps",
        Command::DeleteApp(_) => "delete-app",
        Command::CreateApp(_) => "create-app",
        Command::ListFormation(_) => "list-formation",
        Command::UpdateFormation(_) => "update-formation",
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reviewapps",
    version,
    about = "Manage per-branch review apps on a deployment pipeline"
)]
pub(crate) struct Cli {
    /// Base URL of the deployment platform API.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_PLATFORM_URL",
        value_parser = parse_url,
        default_value = DEFAULT_PLATFORM_URL
    )]
    pub(crate) platform_url: Url,
    /// API token for the deployment platform.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_PLATFORM_TOKEN",
        hide_env_values = true
    )]
    pub(crate) platform_token: Option<String>,
    /// Base URL of the source host API.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_SOURCE_URL",
        value_parser = parse_url,
        default_value = DEFAULT_SOURCE_URL
    )]
    pub(crate) source_url: Url,
    /// API token for the source host.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_SOURCE_TOKEN",
        hide_env_values = true
    )]
    pub(crate) source_token: Option<String>,
    /// Pipeline the review apps belong to.
    #[arg(long, global = true, env = "REVIEW_APPS_PIPELINE")]
    pub(crate) pipeline: Option<String>,
    /// Repository hosting the branches, as owner/name.
    #[arg(long, global = true, env = "REVIEW_APPS_REPOSITORY")]
    pub(crate) repository: Option<String>,
    /// HTTP timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    /// Seconds between status checks while creating.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS
    )]
    pub(crate) poll_interval_secs: u64,
    /// Give up waiting for a new review app after this many seconds.
    #[arg(long, global = true, env = "REVIEW_APPS_MAX_WAIT_SECS")]
    pub(crate) max_wait_secs: Option<u64>,
    /// Configuration variable holding the database connection URI.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_CREDENTIAL_KEY",
        default_value = DEFAULT_CREDENTIAL_KEY
    )]
    pub(crate) credential_key: String,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    /// Log output format (`pretty` or `json`).
    #[arg(
        long,
        global = true,
        env = "REVIEW_APPS_LOG_FORMAT",
        value_parser = parse_log_format,
        default_value = "pretty"
    )]
    pub(crate) log_format: LogFormat,
    /// Print status updates even when stderr is not a terminal.
    #[arg(long, global = true, env = "REVIEW_APPS_PROGRESS")]
    pub(crate) progress: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List review apps in the pipeline.
    ListApps(ListAppsArgs),
    /// Delete the review app deployed from a branch.
    DeleteApp(BranchArgs),
    /// Create a review app for a branch and wait until it is provisioned.
    CreateApp(BranchArgs),
    /// List the formation of a branch's review app.
    ListFormation(BranchArgs),
    /// Scale one process type of a branch's review app.
    UpdateFormation(UpdateFormationArgs),
}

/// Output selection shared by every command.
#[derive(Debug, Clone, Copy, Args)]
pub(crate) struct OutputArgs {
    /// Print a single JSON document instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

impl OutputArgs {
    pub(crate) const fn format(self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub(crate) struct ListAppsArgs {
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Debug, Args)]
pub(crate) struct BranchArgs {
    /// Source branch of the review app.
    #[arg(long)]
    pub(crate) branch: String,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateFormationArgs {
    /// Source branch of the review app.
    #[arg(long)]
    pub(crate) branch: String,
    /// Process type to scale.
    #[arg(long = "formation-type", default_value = DEFAULT_PROCESS_TYPE)]
    pub(crate) formation_type: String,
    /// Desired instance count.
    #[arg(long, default_value_t = DEFAULT_QUANTITY)]
    pub(crate) quantity: u32,
    /// New size class for the process type.
    #[arg(long)]
    pub(crate) size: Option<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

/// Parse a base URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("invalid URL '{input}': not a base URL"));
    }
    Ok(url)
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}
