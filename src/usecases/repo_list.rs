use crate::{
    clients::repos::RepoDirectory,
    dto::repos::{EmptyStateResponse, RepoListQueryState, RepoListResponse},
    error::AppResult,
    models::{billing::PlanTier, repos::ConfiguredFilter},
    usecases::repo_query::{
        build_query_params, merge_special_rows, named_lookup_params, should_include_demo,
    },
};

pub const LOAD_MORE_LABEL: &str = "Load More";
pub const NO_REPOS_MESSAGE: &str = "No repos setup yet";
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// Everything about the viewer and deployment that shapes one list page but
/// is not part of the table's own query state.
#[derive(Debug, Clone)]
pub struct ListViewContext {
    pub account_tier: PlanTier,
    pub is_owner_page: bool,
    pub self_hosted: bool,
    pub demo_repo: Option<String>,
    /// Last repository the viewer navigated into, already read from the
    /// per-owner store.
    pub recent_repo: Option<String>,
}

/// Business logic for the repository-list screen.
pub struct RepoListService;

impl RepoListService {
    /// Fetches one merged page. The primary page, the demo lookup, the
    /// recently-visited lookup, and the configured count are independent
    /// requests with no ordering guarantee; the merge treats any sub-result
    /// that failed or was skipped as empty. Only the primary page is
    /// allowed to fail the view.
    pub async fn list(
        directory: &dyn RepoDirectory,
        provider: &str,
        owner: &str,
        state: &RepoListQueryState,
        view: &ListViewContext,
    ) -> AppResult<RepoListResponse> {
        let params = build_query_params(state, view.account_tier);
        let search_active = !state.search_term.trim().is_empty();
        let demo_relevant =
            view.demo_repo.is_some() && view.is_owner_page && !view.self_hosted;

        let (primary, demo_rows, recent_rows, configured_count) = tokio::join!(
            directory.fetch_page(provider, owner, &params),
            async {
                let Some(name) = view.demo_repo.as_ref().filter(|_| demo_relevant) else {
                    return Vec::new();
                };
                match directory
                    .fetch_page(provider, owner, &named_lookup_params(vec![name.clone()]))
                    .await
                {
                    Ok(page) => page.repos,
                    Err(err) => {
                        tracing::warn!("Demo repo lookup failed for {}/{}: {}", provider, owner, err);
                        Vec::new()
                    }
                }
            },
            async {
                let Some(name) = view.recent_repo.as_ref() else {
                    return Vec::new();
                };
                match directory
                    .fetch_page(provider, owner, &named_lookup_params(vec![name.clone()]))
                    .await
                {
                    Ok(page) => page.repos,
                    Err(err) => {
                        tracing::warn!(
                            "Recently-visited lookup failed for {}/{}: {}",
                            provider,
                            owner,
                            err
                        );
                        Vec::new()
                    }
                }
            },
            async {
                if !demo_relevant || search_active {
                    return None;
                }
                match directory.configured_count(provider, owner).await {
                    Ok(count) => Some(count),
                    Err(err) => {
                        tracing::warn!(
                            "Configured count lookup failed for {}/{}: {}",
                            provider,
                            owner,
                            err
                        );
                        None
                    }
                }
            },
        );

        let page = primary?;
        let include_demo = match view.demo_repo.as_ref() {
            Some(name) => should_include_demo(
                &state.search_term,
                view.is_owner_page,
                view.self_hosted,
                configured_count,
                name,
            ),
            None => false,
        };

        let rows = merge_special_rows(
            page.repos,
            demo_rows,
            recent_rows,
            view.recent_repo.as_deref(),
            &state.search_term,
            include_demo,
        );

        let empty_state = if rows.is_empty() {
            Some(if search_active {
                EmptyStateResponse {
                    message: NO_RESULTS_MESSAGE.to_string(),
                    suggested_filter: None,
                }
            } else {
                EmptyStateResponse {
                    message: NO_REPOS_MESSAGE.to_string(),
                    suggested_filter: Some(ConfiguredFilter::NotConfigured),
                }
            })
        } else {
            None
        };

        Ok(RepoListResponse {
            rows,
            load_more: page
                .page_info
                .has_next_page
                .then(|| LOAD_MORE_LABEL.to_string()),
            page_info: page.page_info,
            empty_state,
            team_view: view.account_tier == PlanTier::Team,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::repos::{RepoListParams, RepoOrdering},
        error::AppError,
        models::repos::{RepoPage, RepoPageInfo, RepositoryRow, RowKind},
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn repo(name: &str) -> RepositoryRow {
        RepositoryRow {
            name: name.to_string(),
            owner: "acme".to_string(),
            is_private: false,
            is_active: true,
            is_configured: true,
            coverage_value: Some(74.2),
            tracked_lines: Some(900),
            last_commit_at: None,
        }
    }

    fn page(names: &[&str], has_next: bool) -> RepoPage {
        RepoPage {
            repos: names.iter().map(|name| repo(name)).collect(),
            page_info: RepoPageInfo {
                has_next_page: has_next,
                end_cursor: has_next.then(|| "next".to_string()),
            },
        }
    }

    struct StubDirectory {
        primary: AppResult<RepoPage>,
        lookups_fail: bool,
        configured: AppResult<i64>,
        requests: Mutex<Vec<RepoListParams>>,
    }

    impl StubDirectory {
        fn new(primary: RepoPage) -> Self {
            Self {
                primary: Ok(primary),
                lookups_fail: false,
                configured: Ok(0),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RepoDirectory for StubDirectory {
        async fn fetch_page(
            &self,
            _provider: &str,
            _owner: &str,
            params: &RepoListParams,
        ) -> AppResult<RepoPage> {
            self.requests.lock().unwrap().push(params.clone());

            if let Some(names) = &params.filters.repo_names {
                if self.lookups_fail {
                    return Err(AppError::Upstream { detail: None });
                }
                // Named lookups resolve every requested name.
                return Ok(RepoPage {
                    repos: names.iter().map(|name| repo(name)).collect(),
                    page_info: RepoPageInfo::default(),
                });
            }

            match &self.primary {
                Ok(page) => Ok(page.clone()),
                Err(_) => Err(AppError::Upstream { detail: None }),
            }
        }

        async fn configured_count(&self, _provider: &str, _owner: &str) -> AppResult<i64> {
            match &self.configured {
                Ok(count) => Ok(*count),
                Err(_) => Err(AppError::Upstream { detail: None }),
            }
        }
    }

    fn view() -> ListViewContext {
        ListViewContext {
            account_tier: PlanTier::Pro,
            is_owner_page: true,
            self_hosted: false,
            demo_repo: Some("demo-cov".to_string()),
            recent_repo: None,
        }
    }

    #[tokio::test]
    async fn merges_demo_and_recent_rows_ahead_of_the_primary_page() {
        let directory = StubDirectory::new(page(&["alpha", "beta"], false));
        let mut view = view();
        view.recent_repo = Some("omega".to_string());

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view,
        )
        .await
        .expect("list");

        let kinds: Vec<RowKind> = response.rows.iter().map(|row| row.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Demo,
                RowKind::RecentlyVisited,
                RowKind::Primary,
                RowKind::Primary
            ]
        );
        assert!(response.empty_state.is_none());
    }

    #[tokio::test]
    async fn failed_sub_lookups_degrade_to_the_primary_page() {
        let mut directory = StubDirectory::new(page(&["alpha"], false));
        directory.lookups_fail = true;
        directory.configured = Ok(0);
        let mut view = view();
        view.recent_repo = Some("omega".to_string());

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view,
        )
        .await
        .expect("primary page still renders");

        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].kind, RowKind::Primary);
    }

    #[tokio::test]
    async fn configured_count_failure_skips_the_demo_row() {
        let mut directory = StubDirectory::new(page(&["alpha"], false));
        directory.configured = Err(AppError::Upstream { detail: None });

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view(),
        )
        .await
        .expect("list");

        assert!(response.rows.iter().all(|row| row.kind == RowKind::Primary));
    }

    #[tokio::test]
    async fn empty_page_without_search_prompts_setup() {
        let directory = StubDirectory::new(page(&[], false));
        let mut view = view();
        view.demo_repo = None;

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view,
        )
        .await
        .expect("list");

        let empty = response.empty_state.expect("empty state");
        assert_eq!(empty.message, "No repos setup yet");
        assert_eq!(empty.suggested_filter, Some(ConfiguredFilter::NotConfigured));
        assert!(response.load_more.is_none());
    }

    #[tokio::test]
    async fn empty_page_with_search_reports_no_results() {
        let directory = StubDirectory::new(page(&[], false));
        let mut state = RepoListQueryState::default();
        state.search_term = "zebra".to_string();
        let mut view = view();
        view.demo_repo = None;

        let response = RepoListService::list(&directory, "gh", "acme", &state, &view)
            .await
            .expect("list");

        let empty = response.empty_state.expect("empty state");
        assert_eq!(empty.message, "No results found");
        assert_eq!(empty.suggested_filter, None);
    }

    #[tokio::test]
    async fn load_more_label_tracks_has_next_page() {
        let directory = StubDirectory::new(page(&["alpha"], true));

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view(),
        )
        .await
        .expect("list");

        assert_eq!(response.load_more.as_deref(), Some("Load More"));
        assert!(response.page_info.has_next_page);
        assert_eq!(response.page_info.end_cursor.as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn team_tier_forces_public_and_flags_the_restricted_view() {
        let directory = StubDirectory::new(page(&["alpha"], false));
        let mut view = view();
        view.account_tier = PlanTier::Team;
        view.demo_repo = None;

        let response = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view,
        )
        .await
        .expect("list");

        assert!(response.team_view);
        let requests = directory.requests.lock().unwrap();
        let primary = requests
            .iter()
            .find(|params| params.filters.repo_names.is_none())
            .expect("primary request");
        assert_eq!(primary.filters.is_public, Some(true));
    }

    #[tokio::test]
    async fn demo_lookup_is_skipped_off_the_owner_page() {
        let directory = StubDirectory::new(page(&["alpha"], false));
        let mut view = view();
        view.is_owner_page = false;

        RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view,
        )
        .await
        .expect("list");

        let requests = directory.requests.lock().unwrap();
        assert!(
            requests
                .iter()
                .all(|params| params.filters.repo_names.is_none()),
            "no named lookup should have been issued"
        );
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn search_matching_the_demo_repo_shows_it_despite_onboarding_being_done() {
        let mut directory = StubDirectory::new(page(&[], false));
        directory.configured = Ok(25);
        let mut state = RepoListQueryState::default();
        state.search_term = "demo".to_string();

        let response = RepoListService::list(&directory, "gh", "acme", &state, &view())
            .await
            .expect("list");

        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].kind, RowKind::Demo);
        assert_eq!(response.rows[0].repo.name, "demo-cov");
        assert!(response.empty_state.is_none());
    }

    #[tokio::test]
    async fn primary_failure_fails_the_view() {
        let mut directory = StubDirectory::new(page(&[], false));
        directory.primary = Err(AppError::Upstream { detail: None });

        let err = RepoListService::list(
            &directory,
            "gh",
            "acme",
            &RepoListQueryState::default(),
            &view(),
        )
        .await
        .expect_err("primary failure propagates");
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn ordering_enum_reaches_the_wire_request() {
        let directory = StubDirectory::new(page(&["alpha"], false));
        let mut state = RepoListQueryState::default();
        state.sort_column = crate::models::repos::SortColumn::Name;
        state.sort_direction = crate::models::repos::SortDirection::Asc;
        let mut view = view();
        view.demo_repo = None;

        RepoListService::list(&directory, "gh", "acme", &state, &view)
            .await
            .expect("list");

        let requests = directory.requests.lock().unwrap();
        assert_eq!(requests[0].ordering, RepoOrdering::Name);
    }
}
