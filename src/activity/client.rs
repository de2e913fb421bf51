//! GitHub API client
//!
//! Minimal GitHub API client for fetching repository listings, issues,
//! comments, and reviews.

use super::records::{IssueRecord, SubRecord};
use super::retry::RetryPolicy;
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use ohno::IntoAppError;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Every list endpoint is fetched at the maximum page size GitHub allows.
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
}

/// GitHub API client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl Client {
    /// Create a new API client with optional authentication token and base URL.
    pub fn new(token: Option<&str>, base_url: impl Into<String>, retry: RetryPolicy) -> Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let mut client_builder = reqwest::Client::builder().user_agent("gh-activity");

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            http: client_builder.build()?,
            base_url: base_url.into(),
            retry,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One page of the organization's repository names.
    pub async fn repositories_page(&self, org: &str, page: u32) -> Result<Vec<String>> {
        let url = self.endpoint(&format!("orgs/{org}/repos"), &[("type", "all")], page)?;
        let repos: Vec<RawRepository> = self.get_json(url).await?;
        Ok(repos.into_iter().map(|r| r.name).collect())
    }

    /// One page of a repository's issues and pull requests.
    ///
    /// The listing covers both states and is bounded below by `since`; when
    /// `creator` is given, the server restricts the listing to that author.
    pub async fn issues_page(
        &self,
        org: &str,
        repo: &str,
        creator: Option<&str>,
        since: DateTime<Utc>,
        page: u32,
    ) -> Result<Vec<IssueRecord>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut params = vec![("state", "all"), ("since", since.as_str())];
        if let Some(creator) = creator {
            params.push(("creator", creator));
        }

        let url = self.endpoint(&format!("repos/{org}/{repo}/issues"), &params, page)?;
        self.get_json(url).await
    }

    /// One page of the comments on a single issue or pull request.
    pub async fn issue_comments_page(&self, org: &str, repo: &str, number: u64, page: u32) -> Result<Vec<SubRecord>> {
        let url = self.endpoint(&format!("repos/{org}/{repo}/issues/{number}/comments"), &[], page)?;
        self.get_json(url).await
    }

    /// One page of the reviews on a single pull request.
    pub async fn pull_reviews_page(&self, org: &str, repo: &str, number: u64, page: u32) -> Result<Vec<SubRecord>> {
        let url = self.endpoint(&format!("repos/{org}/{repo}/pulls/{number}/reviews"), &[], page)?;
        self.get_json(url).await
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)], page: u32) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .into_app_err_with(|| format!("invalid API URL for '{path}'"))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                let _ = query.append_pair(key, value);
            }
            let _ = query.append_pair("per_page", PAGE_SIZE);
            let _ = query.append_pair("page", &page.to_string());
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let response = self.retry.execute(url.as_str(), || self.http.get(url.clone()).send()).await?;

        response
            .json()
            .await
            .into_app_err_with(|| format!("could not decode response from '{url}'"))
    }
}
