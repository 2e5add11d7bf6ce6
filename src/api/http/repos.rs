use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::{
    app::{middleware::ViewerContext, state::AppState},
    dto::repos::{ActionMessage, RepoListQueryState, RepoListResponse},
    error::AppError,
    usecases::{
        repo_list::{ListViewContext, RepoListService},
        upgrade::BillingService,
    },
};

/// Returns one merged repository page for the owner being viewed.
pub async fn list_repos_handle(
    State(state): State<AppState>,
    Extension(viewer): Extension<ViewerContext>,
    Path((provider, owner)): Path<(String, String)>,
    Query(query_state): Query<RepoListQueryState>,
) -> Result<Json<RepoListResponse>, AppError> {
    let view = resolve_view_context(&state, &viewer, &provider, &owner).await?;
    let response =
        RepoListService::list(state.directory.as_ref(), &provider, &owner, &query_state, &view)
            .await?;

    Ok(Json(response))
}

/// Records the repository the viewer just navigated into.
pub async fn record_visit_handle(
    State(state): State<AppState>,
    Path((provider, owner, repo)): Path<(String, String, String)>,
) -> Result<Json<ActionMessage>, AppError> {
    state.recent_visits.record_visit(&provider, &owner, &repo).await?;

    Ok(Json(ActionMessage {
        message: "Visit recorded".to_string(),
    }))
}

/// Assembles the per-request view context: the owner's plan tier, whether
/// the viewer is on their own page, and the special-row inputs. The
/// recently-visited lookup degrades to "no row" on store errors.
pub async fn resolve_view_context(
    state: &AppState,
    viewer: &ViewerContext,
    provider: &str,
    owner: &str,
) -> Result<ListViewContext, AppError> {
    let account = BillingService::load_account(&state.billing, provider, owner).await?;

    let recent_repo = match state.recent_visits.last_visited(provider, owner).await {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!("Recent-visit lookup failed for {}/{}: {}", provider, owner, err);
            None
        }
    };

    Ok(ListViewContext {
        account_tier: account.current_plan.tier(),
        is_owner_page: viewer.is_owner(owner),
        self_hosted: state.config.self_hosted,
        demo_repo: state.config.demo_repo.clone(),
        recent_repo,
    })
}
