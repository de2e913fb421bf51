use crate::Result;
use crate::activity::WindowReport;
use core::fmt::Write;
use owo_colors::OwoColorize;

/// Render one window's activity as human-readable console text.
pub fn generate<W: Write>(report: &WindowReport, use_colors: bool, writer: &mut W) -> Result<()> {
    let heading = format!("Activities from {} to {}:", report.window.start(), report.window.end());
    if use_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{heading}")?;
    }

    if report.activities.is_empty() {
        writeln!(writer, "  no activity found")?;
        return Ok(());
    }

    for activity in &report.activities {
        writeln!(writer)?;
        if use_colors {
            writeln!(writer, "{}", activity.repository.bold())?;
        } else {
            writeln!(writer, "{}", activity.repository)?;
        }

        writeln!(writer, "  Issues created: {}", activity.issues_created)?;
        writeln!(writer, "  Issue comments: {}", activity.issue_comments)?;
        writeln!(writer, "  PRs created: {}", activity.prs_created)?;
        writeln!(writer, "  PR reviews: {}", activity.pr_reviews)?;
    }

    Ok(())
}
