//! Source archive resolution against the source-control host.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use reviewapps_api_models::SourceArchive;
use tracing::{debug, info};

use crate::error::{ReviewError, ReviewResult};
use crate::service::SourceHost;

/// Repository reference of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySlug {
    owner: String,
    name: String,
}

impl RepositorySlug {
    /// Parse an `owner/name` reference.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidRepository`] when either half is empty or
    /// the separator is missing.
    pub fn parse(input: &str) -> ReviewResult<Self> {
        let trimmed = input.trim();
        let invalid = || ReviewError::InvalidRepository {
            repository: input.to_string(),
        };
        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Owning organization or user.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pull request head filter for `branch` (`owner:branch`).
    #[must_use]
    pub fn head_filter(&self, branch: &str) -> String {
        format!("{}:{branch}", self.owner)
    }
}

impl FromStr for RepositorySlug {
    type Err = ReviewError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl Display for RepositorySlug {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner, self.name)
    }
}

/// Resolve the archive link and latest pull request for `branch`.
///
/// A branch without any pull request yields an archive with no PR number.
///
/// # Errors
///
/// Any collaborator failure (including a missing repository or branch) is
/// returned as [`ReviewError::Upstream`].
pub async fn resolve_source_archive<S>(
    host: &S,
    repository: &RepositorySlug,
    branch: &str,
) -> ReviewResult<SourceArchive>
where
    S: SourceHost + ?Sized,
{
    let url = host
        .archive_link(repository, branch)
        .await
        .map_err(|err| ReviewError::upstream("source.archive_link", err))?;

    let head = repository.head_filter(branch);
    let pull_requests = host
        .pull_requests(repository, &head)
        .await
        .map_err(|err| ReviewError::upstream("source.pull_requests", err))?;
    let pr_number = pull_requests.first().map(|pr| pr.number);

    if pr_number.is_none() {
        debug!(%repository, head = %head, "no pull request matches branch");
    }
    info!(%repository, branch, pr_number, "resolved source archive");

    Ok(SourceArchive { url, pr_number })
}
