//! Value types produced and consumed by the aggregation engine.

use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ohno::app_err;
use serde::Deserialize;

/// Whether an issue-like record is a plain issue or a pull request.
///
/// GitHub's unified issues endpoint returns both; a pull request is marked by
/// the presence of a `pull_request` linkage object. The distinction is decided
/// once, at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Issue,
    PullRequest,
}

/// Marker type to detect if an issue is actually a pull request.
/// Only its presence matters; the linkage fields themselves are not used.
#[derive(Debug, Deserialize)]
pub struct PullRequestMarker {}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct Author {
    login: String,
}

/// Raw wire shape of one entry from the issues listing.
#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    created_at: DateTime<Utc>,
    user: Option<Author>,
    pull_request: Option<PullRequestMarker>,
}

/// One issue-like record with only the fields the engine needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "RawIssue")]
pub struct IssueRecord {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    /// Login of the record's author; `None` for deleted accounts.
    pub author: Option<String>,
    pub kind: RecordKind,
}

impl From<RawIssue> for IssueRecord {
    fn from(raw: RawIssue) -> Self {
        Self {
            number: raw.number,
            created_at: raw.created_at,
            author: raw.user.map(|u| u.login),
            kind: if raw.pull_request.is_some() {
                RecordKind::PullRequest
            } else {
                RecordKind::Issue
            },
        }
    }
}

impl IssueRecord {
    /// Whether this record was created at or before `until`.
    ///
    /// The lower window bound is applied server-side via the `since` query
    /// parameter; this upper bound must always be enforced client-side.
    #[must_use]
    pub fn created_within(&self, until: DateTime<Utc>) -> bool {
        self.created_at <= until
    }
}

/// A comment or review record; only authorship matters for counting.
#[derive(Debug, Clone, Deserialize)]
pub struct SubRecord {
    user: Option<Author>,
}

impl SubRecord {
    /// Case-sensitive authorship test. Records without an author (deleted
    /// accounts) never match.
    #[must_use]
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.login == login)
    }
}

/// A closed reporting interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    /// Create a window, rejecting reversed bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(app_err!("window start date {start} is after end date {end}"));
        }

        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Lower bound as an instant, passed to the API as the `since` parameter.
    #[must_use]
    pub fn since(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Upper bound as an instant. Records created at exactly this instant are
    /// inside the window.
    #[must_use]
    pub fn until(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc()
    }
}

impl core::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Activity counters for one repository within one window.
///
/// Built once per (repository, window) pair and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryActivity {
    pub repository: String,
    pub issues_created: usize,
    pub issue_comments: usize,
    pub prs_created: usize,
    pub pr_reviews: usize,
}

impl RepositoryActivity {
    /// Whether all four counters are zero. Such records are dropped from the
    /// report rather than treated as errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issues_created == 0 && self.issue_comments == 0 && self.prs_created == 0 && self.pr_reviews == 0
    }
}

/// The surviving activity records for one window, ready for rendering.
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: TimeWindow,
    pub activities: Vec<RepositoryActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_issue_deserialize_plain_issue() {
        let json = r#"{
            "number": 7,
            "created_at": "2024-01-15T10:30:00Z",
            "user": { "login": "alice" }
        }"#;

        let record: IssueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.number, 7);
        assert_eq!(record.kind, RecordKind::Issue);
        assert_eq!(record.author.as_deref(), Some("alice"));
    }

    #[test]
    fn test_issue_deserialize_pull_request() {
        let json = r#"{
            "number": 8,
            "created_at": "2024-01-15T10:30:00Z",
            "user": { "login": "bob" },
            "pull_request": {
                "url": "https://api.github.com/repos/owner/repo/pulls/8"
            }
        }"#;

        let record: IssueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, RecordKind::PullRequest);
    }

    #[test]
    fn test_issue_deserialize_missing_author() {
        let json = r#"{
            "number": 9,
            "created_at": "2024-01-15T10:30:00Z",
            "user": null
        }"#;

        let record: IssueRecord = serde_json::from_str(json).unwrap();
        assert!(record.author.is_none());
    }

    #[test]
    fn test_classification_is_exhaustive_and_exclusive() {
        let issue: IssueRecord =
            serde_json::from_str(r#"{"number":1,"created_at":"2024-01-01T00:00:00Z","user":null}"#).unwrap();
        let pr: IssueRecord =
            serde_json::from_str(r#"{"number":2,"created_at":"2024-01-01T00:00:00Z","user":null,"pull_request":{}}"#)
                .unwrap();

        assert_ne!(issue.kind, pr.kind);
        assert!(matches!(issue.kind, RecordKind::Issue));
        assert!(matches!(pr.kind, RecordKind::PullRequest));
    }

    #[test]
    fn test_created_within_boundary() {
        let window = TimeWindow::new(date("2024-01-01"), date("2024-01-31")).unwrap();
        let mut record: IssueRecord =
            serde_json::from_str(r#"{"number":1,"created_at":"2024-01-31T00:00:00Z","user":null}"#).unwrap();

        // Exactly at the bound is included
        assert!(record.created_within(window.until()));

        // One second later is not
        record.created_at += chrono::Duration::seconds(1);
        assert!(!record.created_within(window.until()));

        // A day later is not
        record.created_at += chrono::Duration::days(1);
        assert!(!record.created_within(window.until()));
    }

    #[test]
    fn test_sub_record_author_match_is_case_sensitive() {
        let comment: SubRecord = serde_json::from_str(r#"{"user":{"login":"alice"}}"#).unwrap();
        assert!(comment.is_authored_by("alice"));
        assert!(!comment.is_authored_by("Alice"));
        assert!(!comment.is_authored_by("bob"));
    }

    #[test]
    fn test_sub_record_missing_author_never_matches() {
        let comment: SubRecord = serde_json::from_str(r#"{"user":null}"#).unwrap();
        assert!(!comment.is_authored_by("alice"));
        assert!(!comment.is_authored_by(""));
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        let result = TimeWindow::new(date("2024-02-01"), date("2024-01-01"));
        assert!(result.is_err());
    }

    #[test]
    fn test_window_single_day_is_valid() {
        let window = TimeWindow::new(date("2024-01-01"), date("2024-01-01")).unwrap();
        assert_eq!(window.since(), window.until());
    }

    #[test]
    fn test_window_display() {
        let window = TimeWindow::new(date("2024-01-01"), date("2024-01-31")).unwrap();
        assert_eq!(window.to_string(), "2024-01-01..2024-01-31");
    }

    #[test]
    fn test_activity_is_empty() {
        let activity = RepositoryActivity {
            repository: "demo".to_string(),
            issues_created: 0,
            issue_comments: 0,
            prs_created: 0,
            pr_reviews: 0,
        };
        assert!(activity.is_empty());

        let activity = RepositoryActivity { pr_reviews: 1, ..activity };
        assert!(!activity.is_empty());
    }
}
