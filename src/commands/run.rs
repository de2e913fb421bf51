//! Command dispatch logic for gh-activity

use super::report::{ReportArgs, generate_report};
use crate::{Host, Result};
use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gh-activity", version, author)]
#[command(about = "Report one user's GitHub activity across an organization")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    args: ReportArgs,
}

/// Dispatch command-line arguments to the report workflow
///
/// This function parses the command-line arguments and runs the report.
/// It's designed to be called from main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if argument parsing fails or if the report cannot be produced
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    generate_report(host, &cli.args).await
}
