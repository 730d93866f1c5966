//! Runtime configuration resolved once per invocation.
//!
//! Every value comes from a flag or its environment fallback (handled by clap);
//! handlers receive this struct and never read the environment themselves.

use std::io::{self, IsTerminal};
use std::time::Duration;

use reviewapps_core::{PollPolicy, RepositorySlug};
use url::Url;

use crate::cli::{Cli, Command};
use crate::client::{CliError, CliResult};

#[derive(Debug, Clone)]
pub(crate) struct RuntimeConfig {
    pub(crate) platform_url: Url,
    pub(crate) platform_token: String,
    pub(crate) source_url: Url,
    pub(crate) source_token: Option<String>,
    pub(crate) pipeline: String,
    pub(crate) repository: Option<RepositorySlug>,
    pub(crate) timeout: Duration,
    pub(crate) poll_policy: PollPolicy,
    pub(crate) credential_key: String,
    pub(crate) force_progress: bool,
}

impl RuntimeConfig {
    /// Validate the parsed arguments; nothing here touches the network.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let platform_token = required(
            cli.platform_token.as_deref(),
            "platform token is required (pass --platform-token or set REVIEW_APPS_PLATFORM_TOKEN)",
        )?;
        let pipeline = required(
            cli.pipeline.as_deref(),
            "pipeline is required (pass --pipeline or set REVIEW_APPS_PIPELINE)",
        )?;

        let repository = if matches!(cli.command, Command::CreateApp(_)) {
            let raw = required(
                cli.repository.as_deref(),
                "repository is required (pass --repository or set REVIEW_APPS_REPOSITORY)",
            )?;
            Some(RepositorySlug::parse(&raw)?)
        } else {
            None
        };

        if cli.timeout == 0 {
            return Err(CliError::validation(
                "HTTP timeout must be at least one second",
            ));
        }
        if cli.poll_interval_secs == 0 {
            return Err(CliError::validation(
                "poll interval must be at least one second",
            ));
        }

        Ok(Self {
            platform_url: cli.platform_url.clone(),
            platform_token,
            source_url: cli.source_url.clone(),
            source_token: cli
                .source_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            pipeline,
            repository,
            timeout: Duration::from_secs(cli.timeout),
            poll_policy: PollPolicy {
                interval: Duration::from_secs(cli.poll_interval_secs),
                max_wait: cli.max_wait_secs.map(Duration::from_secs),
            },
            credential_key: cli.credential_key.clone(),
            force_progress: cli.progress,
        })
    }

    pub(crate) fn repository(&self) -> CliResult<&RepositorySlug> {
        self.repository.as_ref().ok_or_else(|| {
            CliError::validation(
                "repository is required (pass --repository or set REVIEW_APPS_REPOSITORY)",
            )
        })
    }

    /// Whether status updates should be printed while polling.
    pub(crate) fn progress_enabled(&self) -> bool {
        self.force_progress || io::stderr().is_terminal()
    }
}

fn required(value: Option<&str>, message: &str) -> CliResult<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CliError::validation(message))
}

#[cfg(test)]
pub(crate) fn config_for_tests(platform_url: &str, source_url: &str) -> RuntimeConfig {
    RuntimeConfig {
        platform_url: platform_url.parse().expect("valid platform URL"),
        platform_token: "platform-token".to_string(),
        source_url: source_url.parse().expect("valid source URL"),
        source_token: Some("source-token".to_string()),
        pipeline: "sample-app".to_string(),
        repository: Some(RepositorySlug::parse("sample/app").expect("valid slug")),
        timeout: Duration::from_secs(5),
        poll_policy: PollPolicy {
            interval: Duration::from_millis(1),
            max_wait: None,
        },
        credential_key: "DATABASE_URL".to_string(),
        force_progress: false,
    }
}
