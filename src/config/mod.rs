//! Application configuration loaded from CLI, environment, and files.
//!
//! A single struct merges values from command-line arguments, environment
//! variables, and configuration files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.tallyman.toml` in the current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TALLYMAN_OWNER`, `TALLYMAN_TOKEN`, and so
//!    on; the token additionally falls back to `GITHUB_PERSONAL_TOKEN` and
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--owner`/`-o`, `--token`/`-t`, ...
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! owner = "octocat"
//! repo = "hello-world"
//! database_url = "github_data.db"
//! state = "all"
//! per_page = 100
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::IngestError;
use crate::github::locator::DEFAULT_API_BASE;
use crate::github::{ListingState, PersonalAccessToken};

/// Environment variables consulted, in order, when no token is configured.
pub const TOKEN_FALLBACK_VARIABLES: [&str; 2] = ["GITHUB_PERSONAL_TOKEN", "GITHUB_TOKEN"];

/// Largest page size the GitHub listing endpoint accepts.
pub const MAX_PER_PAGE: u32 = 100;

const DEFAULT_DATABASE_URL: &str = "github_data.db";
const DEFAULT_PER_PAGE: u32 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Apply pending migrations and exit.
    MigrateOnly,
    /// Record a username to team mapping and exit.
    AssignTeam,
    /// Print the aggregate report and exit.
    Report,
    /// Ingest the configured repository's pull requests.
    Ingest,
}

/// A parsed `username=team` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    /// GitHub login being mapped.
    pub username: String,
    /// Team the login belongs to.
    pub team: String,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use tallyman::TallymanConfig;
///
/// let config = TallymanConfig::load().expect("failed to load configuration");
/// let (owner, repo) = config.require_repository_info().expect("repository required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TALLYMAN",
    discovery(
        dotfile_name = ".tallyman.toml",
        config_file_name = "tallyman.toml",
        app_name = "tallyman"
    )
)]
pub struct TallymanConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `TALLYMAN_TOKEN`, `GITHUB_PERSONAL_TOKEN` or
    ///   `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner (e.g., "octocat").
    ///
    /// Can be provided via:
    /// - CLI: `--owner <OWNER>` or `-o <OWNER>`
    /// - Environment: `TALLYMAN_OWNER`
    /// - Config file: `owner = "..."`
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name (e.g., "hello-world").
    ///
    /// Can be provided via:
    /// - CLI: `--repo <REPO>` or `-r <REPO>`
    /// - Environment: `TALLYMAN_REPO`
    /// - Config file: `repo = "..."`
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Base URL of the GitHub REST API.
    ///
    /// Override for GitHub Enterprise installations.
    #[ortho_config(cli_short = 'a')]
    pub api_base: String,

    /// Local `SQLite` database path used for persistence.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>` or `-d <PATH>`
    /// - Environment: `TALLYMAN_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config(cli_short = 'd')]
    pub database_url: String,

    /// Pull request state filter: `open`, `closed` or `all`.
    #[ortho_config(cli_short = 's')]
    pub state: String,

    /// Pull requests requested per listing page (1 to 100).
    #[ortho_config(cli_short = 'p')]
    pub per_page: u32,

    /// Timeout applied to every GitHub request, in seconds.
    #[ortho_config(cli_short = 'T')]
    pub request_timeout_seconds: u64,

    /// Runs database migrations and exits.
    ///
    /// Can be provided via:
    /// - CLI: `--migrate-db` or `-m`
    /// - Config file: `migrate_db = true`
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment.
    #[ortho_config(cli_short = 'm')]
    pub migrate_db: bool,

    /// Prints the aggregate report as JSON and exits.
    ///
    /// Can be provided via:
    /// - CLI: `--report` or `-R`
    /// - Config file: `report = true`
    #[ortho_config(cli_short = 'R')]
    pub report: bool,

    /// Maps a user to a team (`username=team`) and exits.
    ///
    /// Can be provided via:
    /// - CLI: `--assign-team <USERNAME=TEAM>` or `-A <USERNAME=TEAM>`
    /// - Environment: `TALLYMAN_ASSIGN_TEAM`
    #[ortho_config(cli_short = 'A')]
    pub assign_team: Option<String>,
}

impl Default for TallymanConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            state: ListingState::default().as_str().to_owned(),
            per_page: DEFAULT_PER_PAGE,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            migrate_db: false,
            report: false,
            assign_team: None,
        }
    }
}

impl TallymanConfig {
    /// Determines the operation mode based on provided configuration.
    ///
    /// `migrate_db` wins over `assign_team`, which wins over `report`;
    /// without any of them the run ingests.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateOnly
        } else if self.assign_team.is_some() {
            OperationMode::AssignTeam
        } else if self.report {
            OperationMode::Report
        } else {
            OperationMode::Ingest
        }
    }

    /// Resolves the token from configuration or the fallback environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, IngestError> {
        let configured = self
            .token
            .clone()
            .filter(|token| !token.trim().is_empty());
        let token = configured
            .or_else(|| {
                TOKEN_FALLBACK_VARIABLES.iter().find_map(|name| {
                    env::var(name)
                        .ok()
                        .filter(|value| !value.trim().is_empty())
                })
            })
            .ok_or(IngestError::MissingToken)?;
        PersonalAccessToken::new(token)
    }

    /// Returns owner and repo if both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when owner or repo is missing.
    pub fn require_repository_info(&self) -> Result<(&str, &str), IngestError> {
        let owner = non_blank(self.owner.as_deref());
        let repo = non_blank(self.repo.as_deref());
        match (owner, repo) {
            (Some(found_owner), Some(found_repo)) => Ok((found_owner, found_repo)),
            (None, _) => Err(IngestError::Configuration {
                message: "repository owner is required (use --owner or -o)".to_owned(),
            }),
            (_, None) => Err(IngestError::Configuration {
                message: "repository name is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Parses the configured state filter.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] for anything other than
    /// `open`, `closed` or `all`.
    pub fn listing_state(&self) -> Result<ListingState, IngestError> {
        self.state.parse()
    }

    /// Returns the page size once checked against GitHub's limits.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when the value is outside
    /// `1..=100`.
    pub fn validated_per_page(&self) -> Result<u8, IngestError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(IngestError::Configuration {
                message: format!(
                    "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                    self.per_page
                ),
            });
        }
        u8::try_from(self.per_page).map_err(|_| IngestError::Configuration {
            message: format!("per_page {} does not fit a page size", self.per_page),
        })
    }

    /// Returns the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when the timeout is zero.
    pub fn request_timeout(&self) -> Result<Duration, IngestError> {
        if self.request_timeout_seconds == 0 {
            return Err(IngestError::Configuration {
                message: "request_timeout_seconds must be at least 1".to_owned(),
            });
        }
        Ok(Duration::from_secs(self.request_timeout_seconds))
    }

    /// Parses `--assign-team`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when the option is missing or
    /// is not of the form `username=team` with both sides non-blank.
    pub fn team_assignment(&self) -> Result<TeamAssignment, IngestError> {
        let raw = self
            .assign_team
            .as_deref()
            .ok_or_else(|| IngestError::Configuration {
                message: "--assign-team requires a username=team value".to_owned(),
            })?;

        let parsed = raw.split_once('=').and_then(|(username, team)| {
            let trimmed_user = username.trim();
            let trimmed_team = team.trim();
            (!trimmed_user.is_empty() && !trimmed_team.is_empty()).then(|| TeamAssignment {
                username: trimmed_user.to_owned(),
                team: trimmed_team.to_owned(),
            })
        });

        parsed.ok_or_else(|| IngestError::Configuration {
            message: format!("expected username=team, got '{raw}'"),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests;
