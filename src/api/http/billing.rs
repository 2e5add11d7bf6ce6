use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    app::state::AppState,
    dto::billing::{
        AccountResponse, PendingVerificationResponse, PlanCatalogResponse,
        UpgradeCompletedResponse, UpgradeFormQuery, UpgradeFormResponse, UpgradePreviewQuery,
        UpgradePreviewResponse, UpgradeRequest,
    },
    error::AppError,
    usecases::upgrade::{BillingService, UpgradeOutcome},
};

/// Returns the plan catalog for an owner.
pub async fn get_plans_handle(
    State(state): State<AppState>,
    Path((provider, owner)): Path<(String, String)>,
) -> Result<Json<PlanCatalogResponse>, AppError> {
    let data = BillingService::load_catalog(&state.billing, &provider, &owner).await?;

    Ok(Json(PlanCatalogResponse { data }))
}

/// Returns the account's current subscription state.
pub async fn get_account_handle(
    State(state): State<AppState>,
    Path((provider, owner)): Path<(String, String)>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = BillingService::load_account(&state.billing, &provider, &owner).await?;

    Ok(Json(AccountResponse::from(account)))
}

/// Seeds the upgrade form with the account's default selection, or with a
/// plan carried over from the pricing page.
pub async fn get_upgrade_form_handle(
    State(state): State<AppState>,
    Path((provider, owner)): Path<(String, String)>,
    Query(query): Query<UpgradeFormQuery>,
) -> Result<Json<UpgradeFormResponse>, AppError> {
    let form = BillingService::form_defaults(
        &state.billing,
        &provider,
        &owner,
        query.plan_id.as_deref(),
    )
    .await?;

    Ok(Json(form))
}

/// Validates a candidate selection and returns both cadence totals.
pub async fn preview_upgrade_handle(
    State(state): State<AppState>,
    Path((provider, owner)): Path<(String, String)>,
    Query(query): Query<UpgradePreviewQuery>,
) -> Result<Json<UpgradePreviewResponse>, AppError> {
    let preview =
        BillingService::preview(&state.billing, &provider, &owner, &query.plan_id, query.seats)
            .await?;

    Ok(Json(preview))
}

/// Submits the upgrade mutation. Responds with 409 when a pending
/// unverified payment method must be explicitly discarded first.
pub async fn submit_upgrade_handle(
    State(state): State<AppState>,
    Path((provider, owner)): Path<(String, String)>,
    Json(req): Json<UpgradeRequest>,
) -> Result<Response, AppError> {
    let outcome = BillingService::submit(&state.billing, &provider, &owner, &req).await?;

    let response = match outcome {
        UpgradeOutcome::Completed {
            message,
            redirect_to,
        } => (
            StatusCode::OK,
            Json(UpgradeCompletedResponse {
                success: true,
                message,
                redirect_to,
            }),
        )
            .into_response(),
        UpgradeOutcome::PendingVerification {
            hosted_verification_url,
        } => (
            StatusCode::CONFLICT,
            Json(PendingVerificationResponse {
                requires_confirmation: true,
                hosted_verification_url,
            }),
        )
            .into_response(),
    };

    Ok(response)
}
