use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::issue::{Category, Issue, Status};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub total_issues: u64,
    pub open_issues: u64,
    pub resolved_issues: u64,
    #[schema(value_type = Object)]
    pub category_breakdown: BTreeMap<Category, u64>,
}

impl Default for IssueStats {
    fn default() -> Self {
        Self {
            total_issues: 0,
            open_issues: 0,
            resolved_issues: 0,
            category_breakdown: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
        }
    }
}

impl IssueStats {
    pub fn collect<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        issues.into_iter().fold(Self::default(), |mut stats, issue| {
            stats.total_issues += 1;
            match issue.status {
                Status::Open => stats.open_issues += 1,
                Status::Resolved => stats.resolved_issues += 1,
            }
            *stats.category_breakdown.entry(issue.category).or_insert(0) += 1;
            stats
        })
    }
}
