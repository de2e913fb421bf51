use crate::Result;
use crate::activity::WindowReport;
use core::fmt::Write;

const HEADER: &str = "Repository,Issues created,Issue comments,PRs created,PR reviews";

/// Render one window's activity as RFC compliant CSV, one row per repository.
pub fn generate<W: Write>(report: &WindowReport, writer: &mut W) -> Result<()> {
    writeln!(writer, "{HEADER}")?;

    for activity in &report.activities {
        writeln!(
            writer,
            "{},{},{},{},{}",
            quote_csv(&activity.repository),
            activity.issues_created,
            activity.issue_comments,
            activity.prs_created,
            activity.pr_reviews
        )?;
    }

    Ok(())
}

/// Quote a value for RFC compliant CSV output.
///
/// Repository names are always quoted; internal double quotes are doubled
/// per the RFC.
fn quote_csv(s: &str) -> String {
    if s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        format!("\"{s}\"")
    }
}
