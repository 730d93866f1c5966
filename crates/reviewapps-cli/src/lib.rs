#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line manager for per-branch review apps on a deployment pipeline.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `config.rs`: runtime configuration resolved once from flags and environment
//! - `commands/`: command handlers grouped by concern
//! - `client.rs`: CLI errors and the per-command application context
//! - `http.rs`: response classification shared by both HTTP collaborators
//! - `platform.rs` / `source_host.rs`: reqwest implementations of the collaborators
//! - `output.rs`: renderers and the progress indicator
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod http;
pub(crate) mod output;
pub(crate) mod platform;
pub(crate) mod source_host;

pub use cli::run;
