use super::report::ReportArgs;
use crate::Result;
use crate::activity::{RetryPolicy, TimeWindow};
use chrono::NaiveDate;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::PathBuf;

/// One reporting window as written in the configuration file.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub organization whose repositories are examined
    pub org: Option<String>,

    /// Login of the user whose activity is counted
    pub user: Option<String>,

    /// Restrict the report to these repositories instead of listing the
    /// whole organization
    #[serde(default)]
    pub repos: Vec<String>,

    /// Base URL of the GitHub REST API
    pub api_url: Option<String>,

    /// Reporting windows, one report per entry
    #[serde(default)]
    pub windows: Vec<WindowSpec>,

    /// Upper bound on pages fetched per listing
    pub max_pages: Option<u32>,

    /// Maximum number of API requests in flight at once
    pub max_concurrent_requests: Option<usize>,

    /// Total attempts per request before giving up on transient failures
    pub retry_attempts: Option<u32>,

    /// Seconds to wait between retry attempts
    pub retry_delay_secs: Option<u64>,

    /// Directory where CSV reports are written
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// An explicitly given path must exist; the default `activity.toml` is
    /// optional and its absence means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text =
                fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{}'", path.display()))?;
            (path.clone(), text)
        } else {
            let path = PathBuf::from("activity.toml");
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{}'", path.display())),
            }
        };

        toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{}'", final_path.display()))
    }
}

/// Fully resolved settings for one report run.
///
/// Built by layering command-line arguments over the configuration file and
/// validating the result, so everything downstream can assume the settings
/// are complete and consistent before any network traffic happens.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub org: String,
    pub user: String,
    pub repos: Vec<String>,
    pub api_url: String,
    pub token: Option<String>,
    pub windows: Vec<TimeWindow>,
    pub max_pages: u32,
    pub max_concurrent_requests: usize,
    pub retry: RetryPolicy,
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_MAX_PAGES: u32 = 99;
    pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

    /// Merge command-line arguments over the configuration file, with the
    /// arguments taking precedence.
    pub fn resolve(args: &ReportArgs, config: Config) -> Result<Self> {
        let org = args
            .org
            .clone()
            .or(config.org)
            .ok_or_else(|| app_err!("no organization given, use --org or set 'org' in the configuration file"))?;

        let user = args
            .user
            .clone()
            .or(config.user)
            .ok_or_else(|| app_err!("no user given, use --user or set 'user' in the configuration file"))?;

        let repos = if args.repos.is_empty() { config.repos } else { args.repos.clone() };

        let api_url = args
            .api_url
            .clone()
            .or(config.api_url)
            .unwrap_or_else(|| Self::DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();

        let windows = if args.windows.is_empty() {
            config
                .windows
                .iter()
                .map(|spec| TimeWindow::new(spec.start_date, spec.end_date))
                .collect::<Result<Vec<_>>>()?
        } else {
            args.windows.clone()
        };

        if windows.is_empty() {
            return Err(app_err!(
                "no reporting windows given, use --window or add a [[windows]] entry to the configuration file"
            ));
        }

        let max_pages = config.max_pages.unwrap_or(Self::DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            return Err(app_err!("max_pages must be at least 1"));
        }

        let max_concurrent_requests = config
            .max_concurrent_requests
            .unwrap_or(Self::DEFAULT_MAX_CONCURRENT_REQUESTS);
        if max_concurrent_requests == 0 {
            return Err(app_err!("max_concurrent_requests must be at least 1"));
        }

        let default_retry = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: config.retry_attempts.unwrap_or(default_retry.max_attempts),
            delay: config.retry_delay_secs.map_or(default_retry.delay, Duration::from_secs),
        };

        if retry.max_attempts == 0 {
            return Err(app_err!("retry_attempts must be at least 1"));
        }

        Ok(Self {
            org,
            user,
            repos,
            api_url,
            token: args.token.clone(),
            windows,
            max_pages,
            max_concurrent_requests,
            retry,
            output_dir: args.output_dir.clone().or(config.output_dir).unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}

/// Parse a `START..END` pair of dates from the command line.
pub fn parse_window(value: &str) -> core::result::Result<TimeWindow, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{value}'"))?;

    let start: NaiveDate = start.trim().parse().map_err(|e| format!("invalid start date '{start}': {e}"))?;
    let end: NaiveDate = end.trim().parse().map_err(|e| format!("invalid end date '{end}': {e}"))?;

    TimeWindow::new(start, end).map_err(|e| format!("{e:#}"))
}
