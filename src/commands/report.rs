//! The report workflow: resolve settings, aggregate, render.

use super::Host;
use super::config::{Config, RunConfig, parse_window};
use crate::Result;
use crate::activity::{Aggregator, Client, TimeWindow};
use crate::reports::{generate_console, generate_csv};
use clap::{Args, ValueEnum};
use ohno::IntoAppError;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN")]
    pub token: Option<String>,

    /// GitHub organization whose repositories are examined
    #[arg(long, value_name = "ORG")]
    pub org: Option<String>,

    /// Login of the user whose activity is counted
    #[arg(long, value_name = "LOGIN")]
    pub user: Option<String>,

    /// Restrict the report to a repository, repeatable
    #[arg(long = "repo", value_name = "NAME")]
    pub repos: Vec<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Reporting window as START..END dates, repeatable
    #[arg(long = "window", value_name = "START..END", value_parser = parse_window)]
    pub windows: Vec<TimeWindow>,

    /// Path to configuration file (default is `activity.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory where CSV reports are written
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

#[cfg(test)]
impl ReportArgs {
    pub fn for_tests() -> Self {
        Self {
            token: None,
            org: None,
            user: None,
            repos: Vec::new(),
            api_url: None,
            windows: Vec::new(),
            config: None,
            output_dir: None,
            color: ColorMode::Never,
            log_level: LogLevel::None,
        }
    }
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}

/// Aggregate activity for every configured window and render the results.
///
/// All windows are aggregated before anything is rendered, so a failure in
/// any window produces no partial output.
pub async fn generate_report<H: Host>(host: &mut H, args: &ReportArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = Config::load(args.config.as_ref())?;
    let run_config = RunConfig::resolve(args, config)?;

    let client = Client::new(run_config.token.as_deref(), run_config.api_url.clone(), run_config.retry)?;
    let aggregator = Aggregator::new(client, &run_config);
    let reports = aggregator.run(&run_config.windows).await?;

    let use_colors = match args.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            use std::io::{IsTerminal, stdout};
            stdout().is_terminal()
        }
    };

    fs::create_dir_all(&run_config.output_dir)
        .into_app_err_with(|| format!("could not create output directory '{}'", run_config.output_dir.display()))?;

    for report in &reports {
        let mut console_output = String::new();
        _ = generate_console(report, use_colors, &mut console_output);
        let _ = write!(host.output(), "{console_output}");

        let mut csv_output = String::new();
        _ = generate_csv(report, &mut csv_output);

        let filename = run_config
            .output_dir
            .join(format!("activities_{}_{}.csv", report.window.start(), report.window.end()));
        fs::write(&filename, csv_output).into_app_err_with(|| format!("could not write CSV file '{}'", filename.display()))?;

        let _ = writeln!(host.output(), "CSV file has been saved to {}", filename.display());
    }

    Ok(())
}
