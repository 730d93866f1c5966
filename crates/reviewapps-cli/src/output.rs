//! Output renderers and the progress indicator.

use std::io::{self, Write};

use anyhow::anyhow;
use reviewapps_api_models::{Formation, ReviewApp, ReviewAppDetails, ReviewAppStatus};
use reviewapps_core::ProgressSink;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_review_apps(apps: &[ReviewApp], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(apps)?,
        OutputFormat::Table => {
            println!("{:<36} {:<6} {:<40} STATUS", "ID", "PR", "BRANCH");
            for app in apps {
                println!(
                    "{:<36} {:<6} {:<40} {}",
                    app.id,
                    format_pr(app.pr_number),
                    app.branch,
                    app.status
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_deleted_review_app(app: &ReviewApp, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(app)?,
        OutputFormat::Table => {
            println!("{:<36} {:<6} BRANCH", "ID", "PR");
            println!("{:<36} {:<6} {}", app.id, format_pr(app.pr_number), app.branch);
        }
    }
    Ok(())
}

pub(crate) fn render_review_app_details(
    details: &ReviewAppDetails,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(details)?,
        OutputFormat::Table => {
            let db = &details.db;
            println!(
                "{:<48} {:<32} {:<7} {:<24} {:<20} {:<24} DB_SCHEME",
                "URL", "DB_HOST", "DB_PORT", "DB_NAME", "DB_USER", "DB_PASSWORD"
            );
            println!(
                "{:<48} {:<32} {:<7} {:<24} {:<20} {:<24} {}",
                or_dash(details.url.as_deref()),
                db.host,
                db.port.map_or_else(|| "-".to_string(), |port| port.to_string()),
                db.name,
                or_dash(db.user.as_deref()),
                or_dash(db.password.as_deref()),
                db.scheme
            );
        }
    }
    Ok(())
}

pub(crate) fn render_formation(formation: &[Formation], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(formation)?,
        OutputFormat::Table => print_formation_rows(formation),
    }
    Ok(())
}

pub(crate) fn render_formation_entry(entry: &Formation, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(entry)?,
        OutputFormat::Table => print_formation_rows(std::slice::from_ref(entry)),
    }
    Ok(())
}

fn print_formation_rows(formation: &[Formation]) {
    println!(
        "{:<36} {:<12} {:<16} {:>8} STATE",
        "ID", "TYPE", "SIZE", "QUANTITY"
    );
    for entry in formation {
        println!(
            "{:<36} {:<12} {:<16} {:>8} {}",
            entry.id,
            entry.process_type,
            entry.size,
            entry.quantity,
            or_dash(entry.state.as_deref())
        );
    }
}

#[must_use]
pub(crate) fn format_pr(pr_number: Option<u64>) -> String {
    pr_number.map_or_else(|| "-".to_string(), |number| format!("#{number}"))
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|value| !value.is_empty()).unwrap_or("-")
}

/// Scoped status indicator for the poll loop.
///
/// Opens on the first observed status, prints one line per status while
/// enabled, and closes when dropped if it was ever opened, including on early
/// returns. Failures before polling starts leave stderr untouched.
pub(crate) struct ProgressGuard<W: Write> {
    writer: W,
    enabled: bool,
    observed: usize,
}

impl ProgressGuard<io::Stderr> {
    pub(crate) fn stderr(enabled: bool) -> Self {
        Self::new(io::stderr(), enabled)
    }
}

impl<W: Write> ProgressGuard<W> {
    pub(crate) const fn new(writer: W, enabled: bool) -> Self {
        Self {
            writer,
            enabled,
            observed: 0,
        }
    }
}

impl<W: Write> ProgressSink for ProgressGuard<W> {
    fn observe(&mut self, status: ReviewAppStatus) {
        if self.enabled {
            if self.observed == 0 {
                let _ = writeln!(self.writer, "waiting for review app to provision");
            }
            let _ = writeln!(self.writer, "status: {status}");
            let _ = self.writer.flush();
        }
        self.observed += 1;
    }
}

impl<W: Write> Drop for ProgressGuard<W> {
    fn drop(&mut self) {
        if self.enabled && self.observed > 0 {
            let _ = writeln!(
                self.writer,
                "done waiting after {} status check(s)",
                self.observed
            );
            let _ = self.writer.flush();
        }
    }
}
