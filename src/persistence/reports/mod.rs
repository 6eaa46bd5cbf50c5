//! Aggregate read queries over stored pull requests.
//!
//! Authors are grouped by their mapped team; an author without a mapping is
//! their own group. Time windows compare against `created_at`, which GitHub
//! supplies as `YYYY-MM-DDTHH:MM:SSZ`, so boundaries are rendered in the same
//! form and compared as text.

use chrono::{DateTime, TimeDelta, Utc};
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use serde::Serialize;

use super::PersistenceError;
use super::record::PullRequestRecord;
use super::store::{
    PULL_REQUESTS_TABLE, PullRequestStore, RECORD_COLUMNS, RecordRow, map_query_error,
};

/// Days covered by [`PullRequestStore::daily_counts`] in the default report.
pub const DEFAULT_DAILY_WINDOW_DAYS: u32 = 30;

/// Group key used when a pull request has neither an author nor a mapping.
pub const UNKNOWN_AUTHOR: &str = "unknown";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const WEEK_DAYS: i64 = 7;

/// Pull requests created in the last week versus before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, QueryableByName)]
pub struct WeeklyCounts {
    /// Created within the seven days before the reference time.
    #[diesel(sql_type = BigInt)]
    pub this_week: i64,
    /// Created earlier than that.
    #[diesel(sql_type = BigInt)]
    pub older: i64,
}

/// Pull request total for one team (or unmapped author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, QueryableByName)]
pub struct TeamCount {
    /// Team name, or the author login when unmapped.
    #[diesel(sql_type = Text)]
    pub team: String,
    /// Pull requests attributed to the group.
    #[diesel(sql_type = BigInt)]
    pub pr_count: i64,
}

/// Weekly split for one team (or unmapped author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, QueryableByName)]
pub struct TeamWeeklyCounts {
    /// Team name, or the author login when unmapped.
    #[diesel(sql_type = Text)]
    pub team: String,
    /// Created within the seven days before the reference time.
    #[diesel(sql_type = BigInt)]
    pub this_week: i64,
    /// Created earlier than that.
    #[diesel(sql_type = BigInt)]
    pub older: i64,
}

/// Pull requests created on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, QueryableByName)]
pub struct DailyCount {
    /// Day in `YYYY-MM-DD` form.
    #[diesel(sql_type = Text)]
    pub day: String,
    /// Pull requests created that day.
    #[diesel(sql_type = BigInt)]
    pub pr_count: i64,
}

/// A stored pull request together with its resolved group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestWithTeam {
    /// The stored row.
    #[serde(flatten)]
    pub record: PullRequestRecord,
    /// Team name, or the author login when unmapped.
    pub team: String,
}

/// Every aggregate, as printed by `tallyman --report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Reference time the windows were computed from.
    pub generated_at: String,
    /// Overall weekly split.
    pub weekly: WeeklyCounts,
    /// Totals per team.
    pub teams: Vec<TeamCount>,
    /// Weekly split per team.
    pub weekly_by_team: Vec<TeamWeeklyCounts>,
    /// Per-day totals over the daily window.
    pub daily: Vec<DailyCount>,
}

fn window_start(now: DateTime<Utc>, days: i64) -> String {
    (now - TimeDelta::days(days))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn team_key_sql() -> String {
    format!("COALESCE(tm.team_name, pr.author, '{UNKNOWN_AUTHOR}')")
}

impl PullRequestStore {
    /// Splits all pull requests into the last seven days before `now` and
    /// everything older. Rows without a creation time count in neither.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn weekly_counts(&self, now: DateTime<Utc>) -> Result<WeeklyCounts, PersistenceError> {
        let boundary = window_start(now, WEEK_DAYS);
        self.with_connection(|connection| {
            sql_query(
                "SELECT \
                   COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0) AS this_week, \
                   COALESCE(SUM(CASE WHEN created_at < ? THEN 1 ELSE 0 END), 0) AS older \
                 FROM pull_requests;",
            )
            .bind::<Text, _>(boundary.as_str())
            .bind::<Text, _>(boundary.as_str())
            .get_result(connection)
            .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))
        })
    }

    /// Counts pull requests per team, largest group first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn team_breakdown(&self) -> Result<Vec<TeamCount>, PersistenceError> {
        let query = format!(
            "SELECT {team} AS team, COUNT(*) AS pr_count \
             FROM pull_requests pr \
             LEFT JOIN team_mapping tm ON pr.author = tm.username \
             GROUP BY team \
             ORDER BY pr_count DESC, team ASC;",
            team = team_key_sql()
        );
        self.with_connection(|connection| {
            sql_query(query)
                .load(connection)
                .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))
        })
    }

    /// Weekly split per team, ordered by team.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn weekly_counts_by_team(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TeamWeeklyCounts>, PersistenceError> {
        let boundary = window_start(now, WEEK_DAYS);
        let query = format!(
            "SELECT {team} AS team, \
               SUM(CASE WHEN pr.created_at >= ? THEN 1 ELSE 0 END) AS this_week, \
               SUM(CASE WHEN pr.created_at < ? THEN 1 ELSE 0 END) AS older \
             FROM pull_requests pr \
             LEFT JOIN team_mapping tm ON pr.author = tm.username \
             GROUP BY team \
             ORDER BY team ASC;",
            team = team_key_sql()
        );
        self.with_connection(|connection| {
            sql_query(query)
                .bind::<Text, _>(boundary.as_str())
                .bind::<Text, _>(boundary.as_str())
                .load(connection)
                .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))
        })
    }

    /// Per-day totals for pull requests created in the `days` days before
    /// `now`, oldest day first. Days without pull requests are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn daily_counts(
        &self,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<Vec<DailyCount>, PersistenceError> {
        let boundary = window_start(now, i64::from(days));
        self.with_connection(|connection| {
            sql_query(
                "SELECT DATE(created_at) AS day, COUNT(*) AS pr_count \
                 FROM pull_requests \
                 WHERE created_at >= ? AND DATE(created_at) IS NOT NULL \
                 GROUP BY day \
                 ORDER BY day ASC;",
            )
            .bind::<Text, _>(boundary.as_str())
            .load(connection)
            .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))
        })
    }

    /// Every stored pull request with its group key, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn pull_requests_with_team(&self) -> Result<Vec<PullRequestWithTeam>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(embed)]
            record: RecordRow,
            #[diesel(sql_type = Text)]
            team: String,
        }

        let query = format!(
            "SELECT {RECORD_COLUMNS}, {team} AS team \
             FROM pull_requests pr \
             LEFT JOIN team_mapping tm ON pr.author = tm.username \
             ORDER BY pr.created_at DESC, pr.pr_id DESC;",
            team = team_key_sql()
        );

        self.with_connection(|connection| {
            let rows: Vec<Row> = sql_query(query)
                .load(connection)
                .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))?;

            Ok(rows
                .into_iter()
                .map(|row| PullRequestWithTeam {
                    record: row.record.into(),
                    team: row.team,
                })
                .collect())
        })
    }

    /// Runs every aggregate for the report output.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when any query fails.
    pub fn report_summary(
        &self,
        now: DateTime<Utc>,
        daily_window_days: u32,
    ) -> Result<ReportSummary, PersistenceError> {
        Ok(ReportSummary {
            generated_at: now.format(TIMESTAMP_FORMAT).to_string(),
            weekly: self.weekly_counts(now)?,
            teams: self.team_breakdown()?,
            weekly_by_team: self.weekly_counts_by_team(now)?,
            daily: self.daily_counts(now, daily_window_days)?,
        })
    }
}
