//! Span helpers for command invocations.

use tracing::Span;

use crate::init::build_sha;

/// Span wrapping one command invocation, tagged with its trace identifier.
#[must_use]
pub fn command_span(command: &'static str, trace_id: &str) -> Span {
    tracing::info_span!("command", command, trace_id = %trace_id, build_sha = %build_sha())
}
