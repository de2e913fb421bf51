//! Command-line interface and orchestration for gh-activity
//!
//! This module parses arguments, loads and validates configuration, and
//! drives the end-to-end report workflow.
//!
//! # Execution Flow
//!
//! The `run` function parses command-line arguments using clap and hands them
//! to the report workflow, which:
//!
//! 1. Layers the arguments over the optional TOML configuration file
//! 2. Aggregates activity for every configured window concurrently
//! 3. Writes a console summary and one CSV file per window
//!
//! Configuration is managed through a TOML file listing the organization, the
//! tracked user, and the reporting windows.

mod config;
mod host;
mod report;
mod run;

pub use config::{Config, RunConfig};
pub use host::Host;
pub use report::{ReportArgs, generate_report};
pub use run::run;
