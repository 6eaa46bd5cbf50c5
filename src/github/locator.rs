//! Identity wrappers and URL construction for the ingested repository.

use url::Url;

use super::error::IngestError;
use super::gateway::ListingState;

/// Public GitHub REST API base used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, IngestError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IngestError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, IngestError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IngestError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IngestError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IngestError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

// Tokens end up in error reports and tracing fields; keep them out of Debug.
impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PersonalAccessToken(****)")
    }
}

/// Repository coordinates plus the API base they are served from.
///
/// # Example
///
/// ```
/// use tallyman::github::locator::RepositoryLocator;
///
/// let locator = RepositoryLocator::from_owner_repo("octo", "repo")
///     .expect("should build repository locator");
/// assert_eq!(locator.owner().as_str(), "octo");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MissingRepository` when owner or repo is blank.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, IngestError> {
        Self::new(DEFAULT_API_BASE, owner, repo)
    }

    /// Creates a locator against an explicit API base, such as a GitHub
    /// Enterprise `https://host/api/v3` endpoint.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidUrl` when the API base cannot be parsed or
    /// cannot carry a path, and `IngestError::MissingRepository` when owner or
    /// repo is blank.
    pub fn new(api_base: &str, owner: &str, repo: &str) -> Result<Self, IngestError> {
        let parsed =
            Url::parse(api_base).map_err(|error| IngestError::InvalidUrl(error.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(IngestError::InvalidUrl(format!(
                "API base must be an http(s) URL: {api_base}"
            )));
        }

        Ok(Self {
            api_base: parsed,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Builds the first listing URL of a run.
    ///
    /// Every run starts here; no cursor survives between runs.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidUrl` when the API base cannot be extended
    /// with a path.
    pub fn pulls_url(&self, state: ListingState, per_page: u8) -> Result<Url, IngestError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| IngestError::InvalidUrl("API base cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend([
                "repos",
                self.owner.as_str(),
                self.repository.as_str(),
                "pulls",
            ]);
        url.query_pairs_mut()
            .append_pair("state", state.as_str())
            .append_pair("per_page", &per_page.to_string());
        Ok(url)
    }
}
