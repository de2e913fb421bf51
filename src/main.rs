//! A tool to report per-repository GitHub activity for a single user.
//!
//! # Overview
//!
//! `gh-activity` walks every repository of a GitHub organization and counts,
//! for one user and one or more date windows, the issues opened, issue
//! comments authored, pull requests opened, and pull-request reviews authored.
//! The results are printed to the terminal and saved as one CSV file per
//! window.
//!
//! # Quick Start
//!
//! ```bash
//! export GITHUB_TOKEN=ghp_xxxxxxxxxxxxxxxxxxxx
//! gh-activity --org my-org --user octocat --window 2024-01-01..2024-03-31
//! ```
//!
//! # Configuration
//!
//! Everything can also come from an `activity.toml` file (or a file named
//! with `--config`); command-line values take precedence:
//!
//! ```toml
//! org = "my-org"
//! user = "octocat"
//! api_url = "https://api.github.com"
//!
//! [[windows]]
//! start_date = "2024-01-01"
//! end_date = "2024-03-31"
//!
//! [[windows]]
//! start_date = "2024-04-01"
//! end_date = "2024-06-30"
//! ```
//!
//! An optional `repos = ["name", ...]` list restricts the run to the named
//! repositories instead of enumerating the whole organization.
//!
//! # GitHub Access
//!
//! Provide a personal access token via the `GITHUB_TOKEN` environment
//! variable or the `--token` flag. Unauthenticated access works for public
//! repositories but is subject to much stricter rate limits. Point
//! `--api-url` at an enterprise instance to report on non-github.com hosts.

use gh_activity::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that writes to the real standard streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
