pub mod types;

pub use types::{ContributionSummary, Report};

use crate::github::{Contributions, Issue, ItemState, PullRequest};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Count issues and pull requests by state.
///
/// Merged PRs are closed PRs: they count toward `closed_prs`, and
/// `merged_prs` only reports how many of those were merged.
pub fn summarize(issues: &[Issue], prs: &[PullRequest]) -> ContributionSummary {
    let count_issues = |state: ItemState| issues.iter().filter(|i| i.state == state).count();
    let count_prs = |state: ItemState| prs.iter().filter(|p| p.state == state).count();

    ContributionSummary {
        total_issues: issues.len(),
        open_issues: count_issues(ItemState::Open),
        closed_issues: count_issues(ItemState::Closed),
        total_prs: prs.len(),
        open_prs: count_prs(ItemState::Open),
        closed_prs: count_prs(ItemState::Closed),
        merged_prs: prs.iter().filter(|p| p.is_merged()).count(),
    }
}

/// Bundle a search result with a freshly computed summary.
pub fn build(username: &str, contributions: Contributions) -> Report {
    let summary = summarize(&contributions.issues, &contributions.prs);
    Report {
        username: username.to_string(),
        profile_url: format!("https://github.com/{username}"),
        summary,
        contributions,
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(username = %report.username))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn issue_dates(issue: &Issue) -> String {
    let mut dates = format!("Created: {}", format_date(&issue.created_at));
    if let Some(closed_at) = &issue.closed_at {
        dates.push_str(&format!(" | Closed: {}", format_date(closed_at)));
    }
    dates
}

/// Closed-but-unmerged PRs have no close timestamp in search results, so
/// their last update stands in for it.
fn pr_dates(pr: &PullRequest) -> String {
    let mut dates = format!("Created: {}", format_date(&pr.created_at));
    if let Some(merged_at) = &pr.merged_at {
        dates.push_str(&format!(" | Merged: {}", format_date(merged_at)));
    } else if pr.state == ItemState::Closed {
        dates.push_str(&format!(" | Closed: {}", format_date(&pr.updated_at)));
    }
    dates
}

fn issue_line(summary: &ContributionSummary) -> String {
    format!(
        "{} total ({} open, {} closed)",
        summary.total_issues, summary.open_issues, summary.closed_issues
    )
}

fn pr_line(summary: &ContributionSummary) -> String {
    format!(
        "{} total ({} open, {} closed, {} merged)",
        summary.total_prs, summary.open_prs, summary.closed_prs, summary.merged_prs
    )
}

fn print_terminal_report(report: &Report) {
    let found = &report.contributions;

    println!();
    println!(
        "GitHub contributions for {} ({})",
        report.username.bold(),
        report.profile_url
    );
    println!();

    println!("═══ Contribution Summary ═══");
    println!("Issues: {}", issue_line(&report.summary));
    println!("Pull Requests: {}", pr_line(&report.summary));
    println!();

    println!("═══ Issues ═══");
    if found.issues.is_empty() {
        println!("  No issues found.");
    } else {
        for issue in &found.issues {
            println!("  • {}", issue.title.bold());
            println!("    {}", issue.html_url);
            println!("    Status: {} | {}", colorize_status(&issue.status()), issue_dates(issue));
        }
    }
    println!();

    println!("═══ Pull Requests ═══");
    if found.prs.is_empty() {
        println!("  No pull requests found.");
    } else {
        for pr in &found.prs {
            println!("  • {}", pr.title.bold());
            println!("    {}", pr.html_url);
            println!("    Status: {} | {}", colorize_status(&pr.status()), pr_dates(pr));
        }
    }
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let found = &report.contributions;
    let mut md = String::new();
    md.push_str(&format!(
        "# GitHub contributions for [{}]({})\n\n",
        report.username, report.profile_url
    ));

    md.push_str("## Contribution Summary\n\n");
    md.push_str(&format!("**Issues:** {}\n\n", issue_line(&report.summary)));
    md.push_str(&format!("**Pull Requests:** {}\n\n", pr_line(&report.summary)));

    md.push_str("## Issues\n\n");
    if found.issues.is_empty() {
        md.push_str("No issues found.\n\n");
    } else {
        for issue in &found.issues {
            md.push_str(&format!(
                "- [{}]({}): **{}** | {}\n",
                issue.title,
                issue.html_url,
                issue.status(),
                issue_dates(issue)
            ));
        }
        md.push('\n');
    }

    md.push_str("## Pull Requests\n\n");
    if found.prs.is_empty() {
        md.push_str("No pull requests found.\n");
    } else {
        for pr in &found.prs {
            md.push_str(&format!(
                "- [{}]({}): **{}** | {}\n",
                pr.title,
                pr.html_url,
                pr.status(),
                pr_dates(pr)
            ));
        }
    }

    std::fs::write(path, md)?;
    Ok(())
}

fn colorize_status(status: &str) -> colored::ColoredString {
    match status {
        "Merged" => status.magenta().bold(),
        "open" | "Open" => status.green().bold(),
        _ => status.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::tests::{issue, pull_request, ts};

    fn sample_contributions() -> Contributions {
        Contributions {
            issues: vec![
                issue(1, ItemState::Open),
                issue(2, ItemState::Closed),
                issue(3, ItemState::Closed),
            ],
            prs: vec![
                pull_request(10, ItemState::Open, false),
                pull_request(11, ItemState::Closed, true),
                pull_request(12, ItemState::Closed, false),
            ],
        }
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[], &[]), ContributionSummary::default());
    }

    #[test]
    fn test_summarize_counts_by_state() {
        let found = sample_contributions();
        let summary = summarize(&found.issues, &found.prs);
        assert_eq!(
            summary,
            ContributionSummary {
                total_issues: 3,
                open_issues: 1,
                closed_issues: 2,
                total_prs: 3,
                open_prs: 1,
                closed_prs: 2,
                merged_prs: 1,
            }
        );
    }

    #[test]
    fn test_summary_buckets_add_up() {
        let found = sample_contributions();
        let summary = summarize(&found.issues, &found.prs);
        assert_eq!(summary.open_issues + summary.closed_issues, summary.total_issues);
        assert_eq!(summary.open_prs + summary.closed_prs, summary.total_prs);
        assert!(summary.merged_prs <= summary.closed_prs);
    }

    #[test]
    fn test_merged_pr_counts_as_closed() {
        let prs = vec![pull_request(1, ItemState::Closed, true)];
        let summary = summarize(&[], &prs);
        assert_eq!(summary.closed_prs, 1);
        assert_eq!(summary.open_prs, 0);
        assert_eq!(summary.total_prs, 1);
        assert_eq!(summary.merged_prs, 1);
    }

    #[test]
    fn test_summarize_ignores_order() {
        let found = sample_contributions();
        let mut issues = found.issues.clone();
        let mut prs = found.prs.clone();
        issues.reverse();
        prs.reverse();
        assert_eq!(summarize(&issues, &prs), summarize(&found.issues, &found.prs));
    }

    #[test]
    fn test_build_report_metadata() {
        let report = build("octocat", sample_contributions());
        assert_eq!(report.username, "octocat");
        assert_eq!(report.profile_url, "https://github.com/octocat");
        assert_eq!(report.summary.total_issues, 3);
        assert_eq!(report.contributions.prs.len(), 3);
    }

    #[test]
    fn test_pr_dates() {
        let merged = pull_request(1, ItemState::Closed, true);
        assert_eq!(pr_dates(&merged), "Created: 2024-04-01 | Merged: 2024-04-02");

        let mut closed = pull_request(2, ItemState::Closed, false);
        closed.updated_at = ts("2024-05-09T00:00:00Z");
        assert_eq!(pr_dates(&closed), "Created: 2024-04-01 | Closed: 2024-05-09");

        let open = pull_request(3, ItemState::Open, false);
        assert_eq!(pr_dates(&open), "Created: 2024-04-01");
    }

    #[test]
    fn test_issue_dates() {
        assert_eq!(issue_dates(&issue(1, ItemState::Open)), "Created: 2024-03-01");
        assert_eq!(
            issue_dates(&issue(2, ItemState::Closed)),
            "Created: 2024-03-01 | Closed: 2024-03-05"
        );
    }

    #[test]
    fn test_write_markdown_report() {
        let report = build("octocat", sample_contributions());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_markdown_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# GitHub contributions for [octocat](https://github.com/octocat)"));
        assert!(content.contains("**Issues:** 3 total (1 open, 2 closed)"));
        assert!(content.contains("**Pull Requests:** 3 total (1 open, 2 closed, 1 merged)"));
        assert!(content.contains("[PR 11](https://github.com/org/repo/pull/11): **Merged**"));
        assert!(content.contains("[Issue 1](https://github.com/org/repo/issues/1): **open**"));
    }

    #[test]
    fn test_markdown_empty_lists() {
        let report = build("ghost", Contributions::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        output(&report, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("No issues found."));
        assert!(content.contains("No pull requests found."));
        assert!(content.contains("0 total (0 open, 0 closed)"));
    }

    #[test]
    fn test_output_to_terminal() {
        let report = build("octocat", sample_contributions());
        // Should not panic
        output(&report, None).unwrap();
    }

    #[test]
    fn test_output_to_missing_directory_fails() {
        let report = build("octocat", Contributions::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.md");
        assert!(matches!(output(&report, Some(&path)), Err(ReportError::FileWrite(_))));
    }
}
