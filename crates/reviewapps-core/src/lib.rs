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

//! Review app workflows over the deployment platform and source host.
//!
//! Layout:
//! - `service.rs`: collaborator traits implemented by the HTTP clients and test fakes
//! - `catalog.rs`: pipeline resolution and branch lookups (list/delete)
//! - `source.rs`: source archive and pull request resolution
//! - `orchestrator.rs`: creation state machine and poll loop
//! - `credentials.rs`: connection-string credential extraction
//! - `formation.rs`: formation list/update scoped by branch
//! - `error.rs`: collaborator and workflow error taxonomy

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod formation;
pub mod orchestrator;
pub mod service;
pub mod source;

pub use catalog::{
    delete_review_app, find_review_app, list_review_apps, locate_review_app, resolve_pipeline,
};
pub use credentials::{
    DEFAULT_CREDENTIAL_KEY, describe_application, extract_credential, parse_database_url,
};
pub use error::{ApiError, ApiResult, BoxError, ReviewError, ReviewResult};
pub use formation::{
    DEFAULT_PROCESS_TYPE, DEFAULT_QUANTITY, FormationAdjuster, FormationChange, FormationTarget,
};
pub use orchestrator::{
    CreateReviewApp, DEFAULT_POLL_INTERVAL, NoProgress, PollPolicy, ProgressSink,
    ReviewAppOrchestrator,
};
pub use service::{PlatformApi, SourceHost};
pub use source::{RepositorySlug, resolve_source_archive};
