use crate::{
    clients::repos::{ListFilters, RepoListParams, RepoOrdering},
    dto::repos::RepoListQueryState,
    models::{
        billing::PlanTier,
        repos::{ConfiguredFilter, ListedRepo, RepositoryRow, RowKind, SortColumn},
    },
};

/// Owners need this many configured repositories before the demo row stops
/// appearing by default.
pub const DEMO_CONFIGURED_THRESHOLD: i64 = 2;

pub fn ordering_for(column: SortColumn) -> RepoOrdering {
    match column {
        SortColumn::Name => RepoOrdering::Name,
        SortColumn::Coverage => RepoOrdering::Coverage,
        SortColumn::LatestCommitAt => RepoOrdering::CommitDate,
    }
}

pub fn configured_flag(filter: ConfiguredFilter) -> Option<bool> {
    match filter {
        ConfiguredFilter::Configured => Some(true),
        ConfiguredFilter::NotConfigured => Some(false),
        ConfiguredFilter::All => None,
    }
}

/// Translates table state into one directory-API page request. Team-tier
/// viewers may only browse public repositories, so that filter is forced
/// regardless of the configured-status filter.
pub fn build_query_params(state: &RepoListQueryState, account_tier: PlanTier) -> RepoListParams {
    let term = state.search_term.trim();

    RepoListParams {
        term: if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        },
        ordering: ordering_for(state.sort_column),
        direction: state.sort_direction,
        filters: ListFilters {
            is_configured: configured_flag(state.configured_filter),
            is_public: if account_tier == PlanTier::Team {
                Some(true)
            } else {
                None
            },
            repo_names: None,
        },
        after: state.cursor.clone(),
    }
}

/// Page request that looks up specific repositories by name. Used for the
/// demo and recently-visited sub-fetches.
pub fn named_lookup_params(names: Vec<String>) -> RepoListParams {
    RepoListParams {
        term: None,
        ordering: RepoOrdering::Name,
        direction: SortColumn::Name.natural_direction(),
        filters: ListFilters {
            is_configured: None,
            is_public: None,
            repo_names: Some(names),
        },
        after: None,
    }
}

/// Demo-row rule: only on the owner's own page and never when self-hosted.
/// By default the row appears while the owner has configured fewer than two
/// repositories; an active search overrides that onboarding heuristic and
/// instead shows the row exactly when the term matches its name.
pub fn should_include_demo(
    search_term: &str,
    is_owner_page: bool,
    self_hosted: bool,
    configured_count: Option<i64>,
    demo_name: &str,
) -> bool {
    if !is_owner_page || self_hosted {
        return false;
    }

    let term = search_term.trim();
    if !term.is_empty() {
        return demo_name.to_lowercase().contains(&term.to_lowercase());
    }

    configured_count.is_some_and(|count| count < DEMO_CONFIGURED_THRESHOLD)
}

/// Merges the three independently fetched result sets into the row order
/// the table renders: demo rows first, then the recently-visited row, then
/// the primary page, deduplicated by name. Sub-results that never resolved
/// arrive here as empty sets, not errors.
pub fn merge_special_rows(
    primary: Vec<RepositoryRow>,
    demo: Vec<RepositoryRow>,
    recent: Vec<RepositoryRow>,
    recent_name: Option<&str>,
    search_term: &str,
    include_demo: bool,
) -> Vec<ListedRepo> {
    let mut rows: Vec<ListedRepo> = Vec::with_capacity(primary.len() + demo.len() + 1);
    let mut seen: Vec<String> = Vec::new();

    if include_demo {
        for repo in demo {
            if seen.iter().any(|name| name == &repo.name) {
                continue;
            }
            seen.push(repo.name.clone());
            rows.push(ListedRepo {
                kind: RowKind::Demo,
                repo,
            });
        }
    }

    if let Some(name) = recent_name {
        // A row already in the primary page is lifted out of its natural
        // sort position; otherwise the dedicated lookup supplies it, but
        // never into an active search it does not match.
        let candidate = primary
            .iter()
            .find(|repo| repo.name == name)
            .cloned()
            .or_else(|| {
                if search_term.trim().is_empty() {
                    recent.into_iter().find(|repo| repo.name == name)
                } else {
                    None
                }
            });

        if let Some(repo) = candidate {
            if !seen.iter().any(|existing| existing == &repo.name) {
                seen.push(repo.name.clone());
                rows.push(ListedRepo {
                    kind: RowKind::RecentlyVisited,
                    repo,
                });
            }
        }
    }

    for repo in primary {
        if seen.iter().any(|name| name == &repo.name) {
            continue;
        }
        seen.push(repo.name.clone());
        rows.push(ListedRepo {
            kind: RowKind::Primary,
            repo,
        });
    }

    rows
}
