//! Per-repository activity aggregation.
//!
//! For each repository and window, two traversals of the unified issues
//! listing run concurrently: one restricted to the tracked user, which yields
//! the created-issue and created-PR counts directly, and an unrestricted one,
//! which drives the fan-out over comments and reviews so the user's
//! contributions to other people's threads are counted too.

use super::client::Client;
use super::pager::fetch_all_pages;
use super::records::{IssueRecord, RecordKind, RepositoryActivity, TimeWindow, WindowReport};
use super::throttler::Throttler;
use crate::Result;
use crate::commands::RunConfig;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use ohno::EnrichableExt;
use std::collections::BTreeSet;
use std::sync::Arc;

const LOG_TARGET: &str = "activity::aggregator";

#[derive(Debug)]
pub struct Aggregator {
    client: Client,
    throttler: Arc<Throttler>,
    org: String,
    user: String,
    repos: Vec<String>,
    max_pages: u32,
}

impl Aggregator {
    pub fn new(client: Client, config: &RunConfig) -> Self {
        Self {
            client,
            throttler: Throttler::new(config.max_concurrent_requests),
            org: config.org.clone(),
            user: config.user.clone(),
            repos: config.repos.clone(),
            max_pages: config.max_pages,
        }
    }

    /// Produce one report per window, processing the windows concurrently.
    /// Any window failing fails the whole run.
    pub async fn run(&self, windows: &[TimeWindow]) -> Result<Vec<WindowReport>> {
        let reports = join_all(windows.iter().map(|&window| self.window_activity(window))).await;
        reports.into_iter().collect()
    }

    /// Aggregate activity for one window across all repositories, dropping
    /// repositories where every counter ended up zero.
    pub async fn window_activity(&self, window: TimeWindow) -> Result<WindowReport> {
        let repos = self.repositories().await?;
        log::info!(target: LOG_TARGET, "aggregating activity in {} repositories for {window}", repos.len());

        let results = join_all(repos.iter().map(|repo| async move {
            self.repository_activity(repo, window)
                .await
                .map_err(|e| e.enrich_with(|| format!("could not aggregate activity for repository '{}/{repo}'", self.org)))
        }))
        .await;

        let mut activities = Vec::new();
        for result in results {
            let activity = result?;
            if !activity.is_empty() {
                activities.push(activity);
            }
        }

        Ok(WindowReport { window, activities })
    }

    /// The set of repositories to examine: the configured list when one was
    /// given, otherwise everything in the organization. Enumeration dedups
    /// and orders by name.
    async fn repositories(&self) -> Result<BTreeSet<String>> {
        if !self.repos.is_empty() {
            return Ok(self.repos.iter().cloned().collect());
        }

        let names = fetch_all_pages("repositories", self.max_pages, |page| async move {
            let _permit = self.throttler.acquire().await;
            self.client.repositories_page(&self.org, page).await
        })
        .await
        .map_err(|e| e.enrich_with(|| format!("could not list repositories of organization '{}'", self.org)))?;

        Ok(names.into_iter().collect())
    }

    async fn repository_activity(&self, repo: &str, window: TimeWindow) -> Result<RepositoryActivity> {
        let (authored, all) = tokio::try_join!(
            self.issue_records(repo, Some(&self.user), window.since()),
            self.issue_records(repo, None, window.since()),
        )?;

        let (authored_issues, authored_prs) = split_by_kind(&authored, window.until());
        let (all_issues, all_prs) = split_by_kind(&all, window.until());

        let (issue_comments, pr_reviews) = tokio::try_join!(
            self.count_comments_by_user(repo, &all_issues),
            self.count_reviews_by_user(repo, &all_prs),
        )?;

        Ok(RepositoryActivity {
            repository: repo.to_string(),
            issues_created: authored_issues.len(),
            issue_comments,
            prs_created: authored_prs.len(),
            pr_reviews,
        })
    }

    /// All issue-like records of a repository created at or after `since`,
    /// optionally restricted to one author.
    async fn issue_records(&self, repo: &str, creator: Option<&str>, since: DateTime<Utc>) -> Result<Vec<IssueRecord>> {
        fetch_all_pages("issues", self.max_pages, |page| async move {
            let _permit = self.throttler.acquire().await;
            self.client.issues_page(&self.org, repo, creator, since, page).await
        })
        .await
    }

    /// Number of comments the tracked user left across the given issues.
    /// Comments are attributed by authorship alone, whenever they were made.
    async fn count_comments_by_user(&self, repo: &str, issues: &[u64]) -> Result<usize> {
        let fetches = issues.iter().map(|&number| {
            fetch_all_pages("comments", self.max_pages, move |page| async move {
                let _permit = self.throttler.acquire().await;
                self.client.issue_comments_page(&self.org, repo, number, page).await
            })
        });

        let mut total = 0;
        for records in join_all(fetches).await {
            total += records?.iter().filter(|c| c.is_authored_by(&self.user)).count();
        }

        Ok(total)
    }

    /// Number of reviews the tracked user left across the given pull requests.
    async fn count_reviews_by_user(&self, repo: &str, prs: &[u64]) -> Result<usize> {
        let fetches = prs.iter().map(|&number| {
            fetch_all_pages("reviews", self.max_pages, move |page| async move {
                let _permit = self.throttler.acquire().await;
                self.client.pull_reviews_page(&self.org, repo, number, page).await
            })
        });

        let mut total = 0;
        for records in join_all(fetches).await {
            total += records?.iter().filter(|r| r.is_authored_by(&self.user)).count();
        }

        Ok(total)
    }
}

/// Split records into issue numbers and pull request numbers, keeping only
/// records created at or before `until`. The server already enforced the
/// lower window bound via `since`; the upper bound must be applied here.
fn split_by_kind(records: &[IssueRecord], until: DateTime<Utc>) -> (Vec<u64>, Vec<u64>) {
    let mut issues = Vec::new();
    let mut prs = Vec::new();
    for record in records.iter().filter(|r| r.created_within(until)) {
        match record.kind {
            RecordKind::Issue => issues.push(record.number),
            RecordKind::PullRequest => prs.push(record.number),
        }
    }

    (issues, prs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(number: u64, created_at: &str, pull_request: bool) -> IssueRecord {
        let marker = if pull_request { r#","pull_request":{}"# } else { "" };
        serde_json::from_str(&format!(
            r#"{{"number":{number},"created_at":"{created_at}","user":null{marker}}}"#
        ))
        .unwrap()
    }

    fn until(date: &str) -> DateTime<Utc> {
        let date: NaiveDate = date.parse().unwrap();
        TimeWindow::new(date, date).unwrap().until()
    }

    #[test]
    fn test_split_by_kind_separates_issues_and_prs() {
        let records = vec![
            record(1, "2024-01-10T12:00:00Z", false),
            record(2, "2024-01-11T12:00:00Z", true),
            record(3, "2024-01-12T12:00:00Z", false),
        ];

        let (issues, prs) = split_by_kind(&records, until("2024-02-01"));
        assert_eq!(issues, vec![1, 3]);
        assert_eq!(prs, vec![2]);
    }

    #[test]
    fn test_split_by_kind_applies_upper_bound() {
        let records = vec![
            record(1, "2024-01-10T12:00:00Z", false),
            record(2, "2024-02-02T12:00:00Z", false),
            record(3, "2024-02-02T12:00:00Z", true),
        ];

        let (issues, prs) = split_by_kind(&records, until("2024-02-01"));
        assert_eq!(issues, vec![1]);
        assert!(prs.is_empty());
    }

    #[test]
    fn test_split_by_kind_empty_input() {
        let (issues, prs) = split_by_kind(&[], until("2024-02-01"));
        assert!(issues.is_empty());
        assert!(prs.is_empty());
    }
}
