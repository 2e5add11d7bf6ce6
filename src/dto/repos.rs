use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::repos::{ConfiguredFilter, ListedRepo, RepoPageInfo, SortColumn, SortDirection},
};

/// The repository table's query state. Lives in the URL so back/forward
/// navigation restores filters; the cursor resets whenever search, sort, or
/// filter changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoListQueryState {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search_term: String,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub configured_filter: ConfiguredFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Default for RepoListQueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_column: SortColumn::LatestCommitAt,
            sort_direction: SortColumn::LatestCommitAt.natural_direction(),
            configured_filter: ConfiguredFilter::All,
            cursor: None,
        }
    }
}

impl RepoListQueryState {
    /// Encodes the state as the URL query string the dashboard keeps in the
    /// location bar.
    pub fn to_query_string(&self) -> AppResult<String> {
        serde_urlencoded::to_string(self)
            .map_err(|err| AppError::Internal(format!("query state encode failed: {}", err)))
    }

    pub fn from_query_string(raw: &str) -> AppResult<Self> {
        serde_urlencoded::from_str(raw)
            .map_err(|err| AppError::BadRequest(format!("invalid list query: {}", err)))
    }
}

/// Empty-state rendered when a page comes back without rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStateResponse {
    pub message: String,
    /// Shortcut filter offered by the "no repos yet" prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_filter: Option<ConfiguredFilter>,
}

/// Response payload for one merged repository page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoListResponse {
    pub rows: Vec<ListedRepo>,
    pub page_info: RepoPageInfo,
    /// Label of the pagination affordance, present while more pages exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_more: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyStateResponse>,
    /// Team-tier accounts render the restricted column set.
    pub team_view: bool,
}

/// Response payload for simple action messages.
#[derive(Debug, Serialize)]
pub struct ActionMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_state_round_trips_through_the_url() {
        let state = RepoListQueryState {
            search_term: "gazebo api".to_string(),
            sort_column: SortColumn::Coverage,
            sort_direction: SortDirection::Asc,
            configured_filter: ConfiguredFilter::NotConfigured,
            cursor: Some("bmV4dA==".to_string()),
        };
        let encoded = state.to_query_string().expect("encode");
        let decoded = RepoListQueryState::from_query_string(&encoded).expect("decode");
        assert_eq!(decoded, state);
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let decoded = RepoListQueryState::from_query_string("").expect("decode");
        assert_eq!(decoded, RepoListQueryState::default());
        assert_eq!(decoded.sort_column, SortColumn::LatestCommitAt);
        assert_eq!(decoded.sort_direction, SortDirection::Desc);
        assert_eq!(decoded.configured_filter, ConfiguredFilter::All);
        assert_eq!(decoded.cursor, None);
    }

    #[test]
    fn default_state_encodes_compactly() {
        let encoded = RepoListQueryState::default().to_query_string().expect("encode");
        assert!(!encoded.contains("searchTerm"));
        assert!(!encoded.contains("cursor"));
    }
}
