use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sortable columns of the repository table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Name,
    Coverage,
    LatestCommitAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl SortColumn {
    /// Direction a column starts in when it becomes the active sort.
    pub fn natural_direction(&self) -> SortDirection {
        match self {
            SortColumn::Name => SortDirection::Asc,
            SortColumn::Coverage => SortDirection::Desc,
            SortColumn::LatestCommitAt => SortDirection::Desc,
        }
    }
}

/// Configured-status filter of the repository table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfiguredFilter {
    Configured,
    NotConfigured,
    All,
}

/// One repository as the directory upstream reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRow {
    pub name: String,
    pub owner: String,
    pub is_private: bool,
    pub is_active: bool,
    /// Coverage or bundle analysis enabled.
    pub is_configured: bool,
    pub coverage_value: Option<f64>,
    pub tracked_lines: Option<i64>,
    pub last_commit_at: Option<DateTime<Utc>>,
}

/// Why a row appears in the merged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Primary,
    Demo,
    RecentlyVisited,
}

/// A repository row plus its placement label in the merged list.
#[derive(Debug, Clone, Serialize)]
pub struct ListedRepo {
    pub kind: RowKind,
    #[serde(flatten)]
    pub repo: RepositoryRow,
}

/// Cursor bookkeeping returned with every page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoPageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of repositories from the directory upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoPage {
    pub repos: Vec<RepositoryRow>,
    pub page_info: RepoPageInfo,
}
