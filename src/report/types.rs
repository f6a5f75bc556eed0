use crate::github::Contributions;

/// Counts of a user's issues and pull requests by state.
///
/// Always derived from the current lists, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContributionSummary {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub total_prs: usize,
    pub open_prs: usize,
    /// Includes merged PRs
    pub closed_prs: usize,
    /// Subset of `closed_prs`
    pub merged_prs: usize,
}

/// Everything the view renders for one search.
#[derive(Debug)]
pub struct Report {
    /// GitHub login that was searched
    pub username: String,
    /// Link to the user's GitHub profile
    pub profile_url: String,
    pub summary: ContributionSummary,
    pub contributions: Contributions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_zero() {
        let summary = ContributionSummary::default();
        assert_eq!(summary.total_issues, 0);
        assert_eq!(summary.total_prs, 0);
        assert_eq!(summary.merged_prs, 0);
    }
}
