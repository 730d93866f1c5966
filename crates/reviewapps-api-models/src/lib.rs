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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the deployment platform and source host APIs.
//!
//! The CLI encodes requests and decodes responses with these types, and the core
//! crate builds its result records from them, so the wire contract lives in one
//! place.
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logical version tag attached to every submitted source blob.
pub const SOURCE_BLOB_VERSION: &str = "v1.0.0";

/// Configuration variables of an application, keyed by variable name.
pub type ConfigVars = BTreeMap<String, String>;

/// Error document returned by the deployment platform on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformProblem {
    /// Machine-readable error identifier (e.g. `not_found`).
    #[serde(default)]
    pub id: String,
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
}

/// Named deployment grouping that review apps are created under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    /// Platform identifier.
    pub id: Uuid,
    /// Human-readable pipeline name.
    #[serde(default)]
    pub name: String,
}

/// Lifecycle status reported for a review app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAppStatus {
    /// Accepted but not yet picked up by the platform.
    Pending,
    /// Provisioning in progress.
    Creating,
    /// Provisioned successfully; terminal.
    Created,
    /// Provisioning failed; terminal.
    Errored,
    /// Teardown in progress.
    Deleting,
    /// Torn down.
    Deleted,
    /// Any intermediate status this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl ReviewAppStatus {
    /// Whether polling must stop once this status is observed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Created | Self::Errored)
    }

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Errored => "errored",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for ReviewAppStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Reference to the application backing a review app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppReference {
    /// Application identifier.
    pub id: Uuid,
}

/// Branch-scoped preview deployment tracked by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewApp {
    /// Review app identifier.
    pub id: Uuid,
    /// Source branch the review app was built from.
    #[serde(default)]
    pub branch: String,
    /// Pull request number associated with the branch, when known.
    #[serde(default)]
    pub pr_number: Option<u64>,
    /// Current lifecycle status.
    pub status: ReviewAppStatus,
    /// Provisioned application; absent until provisioning progresses far enough.
    #[serde(default)]
    pub app: Option<AppReference>,
    /// Platform message, typically the failure reason once errored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReviewApp {
    /// Identifier of the provisioned application, if any.
    #[must_use]
    pub fn app_id(&self) -> Option<Uuid> {
        self.app.map(|app| app.id)
    }
}

/// Source tarball handed to the platform when creating a review app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceBlob {
    /// Time-limited download URL of the archive.
    pub url: String,
    /// Logical version tag recorded alongside the build.
    pub version: String,
}

/// Body of `POST /review-apps`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateReviewAppRequest {
    /// Branch to deploy.
    pub branch: String,
    /// Owning pipeline identifier.
    pub pipeline: Uuid,
    /// Source archive to build.
    pub source_blob: SourceBlob,
    /// Pull request number; omitted when no pull request matched the branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Application {
    /// Application identifier.
    pub id: Uuid,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Public URL.
    #[serde(default)]
    pub web_url: Option<String>,
}

/// One scaled process type of an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Formation {
    /// Formation identifier.
    pub id: Uuid,
    /// Process type, e.g. `web` or `worker`.
    #[serde(rename = "type")]
    pub process_type: String,
    /// Size class of each instance.
    #[serde(default)]
    pub size: String,
    /// Desired instance count.
    pub quantity: u32,
    /// Command run by the process type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Current state, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Body of `PATCH /apps/{app}/formation/{type}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormationUpdate {
    /// Desired instance count.
    pub quantity: u32,
    /// Optional new size class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Head reference of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestHead {
    /// `owner:branch` label.
    #[serde(default)]
    pub label: String,
    /// Branch name.
    #[serde(rename = "ref", default)]
    pub ref_name: String,
}

/// Pull request as listed by the source host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// `open` or `closed`.
    #[serde(default)]
    pub state: Option<String>,
    /// Browser URL.
    #[serde(default)]
    pub html_url: Option<String>,
    /// Head reference.
    #[serde(default)]
    pub head: Option<PullRequestHead>,
}

/// Downloadable source snapshot plus the pull request it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceArchive {
    /// Time-limited archive download URL.
    pub url: String,
    /// Most recent pull request number for the branch, if any.
    pub pr_number: Option<u64>,
}

/// Database connection fields parsed from a connection-string configuration value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseCredential {
    /// URI scheme, e.g. `postgres`.
    pub scheme: String,
    /// Host name.
    pub host: String,
    /// Port, when the URI carries one.
    pub port: Option<u16>,
    /// Database name (URI path without the leading separator).
    pub name: String,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
}

/// Result record of a successful review app creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewAppDetails {
    /// Review app identifier.
    pub id: Uuid,
    /// Provisioned application identifier.
    pub app_id: Uuid,
    /// Application display name.
    pub name: String,
    /// Public URL of the application.
    pub url: Option<String>,
    /// Parsed database credential.
    pub db: DatabaseCredential,
}
