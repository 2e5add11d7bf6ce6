use std::sync::Arc;

use dashmap::DashSet;

use crate::{
    clients::billing::{BillingApi, UpgradePayload},
    dto::billing::{UpgradeFormResponse, UpgradePreviewResponse, UpgradeRequest},
    error::{AppError, AppResult},
    models::billing::{AccountSubscriptionState, Plan, UpgradeSelection},
    services::cache::ScopedCache,
    usecases::pricing,
};

/// Notification shown after a completed upgrade.
pub const UPGRADE_SUCCESS_MESSAGE: &str = "Plan successfully updated.";

/// Shared billing dependencies: the upstream client, the (provider, owner)
/// scoped caches, and the guard that blocks duplicate in-flight submits.
#[derive(Clone)]
pub struct BillingContext {
    pub api: Arc<dyn BillingApi>,
    pub catalog_cache: Arc<ScopedCache<Vec<Plan>>>,
    pub account_cache: Arc<ScopedCache<AccountSubscriptionState>>,
    pub upgrades_in_flight: Arc<DashSet<String>>,
}

/// Outcome of a submit attempt that did not error.
#[derive(Debug)]
pub enum UpgradeOutcome {
    Completed {
        message: String,
        redirect_to: String,
    },
    /// A prior incomplete upgrade left a payment method awaiting
    /// verification; the caller must confirm discarding it first.
    PendingVerification {
        hosted_verification_url: Option<String>,
    },
}

/// Removes the in-flight marker however the submit path exits.
struct InFlightGuard {
    set: Arc<DashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

fn account_key(provider: &str, owner: &str) -> String {
    format!("{}/{}", provider, owner)
}

/// Business logic for the plan-upgrade screen.
pub struct BillingService;

impl BillingService {
    pub async fn load_catalog(
        ctx: &BillingContext,
        provider: &str,
        owner: &str,
    ) -> AppResult<Vec<Plan>> {
        if let Some(catalog) = ctx.catalog_cache.get(provider, owner) {
            return Ok(catalog);
        }

        let catalog = ctx.api.fetch_catalog(provider, owner).await?;
        ctx.catalog_cache.put(provider, owner, catalog.clone());
        Ok(catalog)
    }

    pub async fn load_account(
        ctx: &BillingContext,
        provider: &str,
        owner: &str,
    ) -> AppResult<AccountSubscriptionState> {
        if let Some(account) = ctx.account_cache.get(provider, owner) {
            return Ok(account);
        }

        let account = ctx.api.fetch_account(provider, owner).await?;
        ctx.account_cache.put(provider, owner, account.clone());
        Ok(account)
    }

    /// Validates a candidate selection and computes both cadence totals for
    /// the same seat count. This backs the form's live gating: an empty
    /// error list enables the submit control, a non-empty one disables it
    /// and the first message is displayed.
    pub async fn preview(
        ctx: &BillingContext,
        provider: &str,
        owner: &str,
        plan_id: &str,
        seats: i32,
    ) -> AppResult<UpgradePreviewResponse> {
        let catalog = Self::load_catalog(ctx, provider, owner).await?;
        let account = Self::load_account(ctx, provider, owner).await?;
        let plan = find_plan(&catalog, plan_id)?.clone();

        Ok(build_preview(&catalog, &account, UpgradeSelection { plan, seats }))
    }

    /// Seeds the upgrade form: the default selection derived from the
    /// account (or the explicitly pre-selected plan), plus its preview.
    pub async fn form_defaults(
        ctx: &BillingContext,
        provider: &str,
        owner: &str,
        preselected_plan_id: Option<&str>,
    ) -> AppResult<UpgradeFormResponse> {
        let catalog = Self::load_catalog(ctx, provider, owner).await?;
        let account = Self::load_account(ctx, provider, owner).await?;

        let preselected = match preselected_plan_id {
            Some(plan_id) => Some(find_plan(&catalog, plan_id)?),
            None => None,
        };

        let selection = pricing::resolve_default_selection(&account, &catalog, preselected)
            .ok_or_else(|| {
                AppError::Internal("Plan catalog is missing the default Pro plan".to_string())
            })?;

        Ok(UpgradeFormResponse {
            plan_id: selection.plan.id.clone(),
            seats: selection.seats,
            preview: build_preview(&catalog, &account, selection),
        })
    }

    /// Submits the upgrade mutation. Validation is re-checked here even
    /// though the form already gates the control on the preview result.
    pub async fn submit(
        ctx: &BillingContext,
        provider: &str,
        owner: &str,
        req: &UpgradeRequest,
    ) -> AppResult<UpgradeOutcome> {
        let catalog = Self::load_catalog(ctx, provider, owner).await?;
        let account = Self::load_account(ctx, provider, owner).await?;
        let plan = find_plan(&catalog, &req.plan_id)?.clone();

        let selection = UpgradeSelection {
            plan,
            seats: req.seats,
        };
        let errors = pricing::validate_seats(&selection, &account);
        if let Some(message) = pricing::first_message(&errors) {
            return Err(AppError::Validation(message));
        }

        if let Some(url) = account.pending_unverified_payment_url {
            if !req.discard_pending_verification {
                return Ok(UpgradeOutcome::PendingVerification {
                    hosted_verification_url: Some(url),
                });
            }
        }

        let key = account_key(provider, owner);
        if !ctx.upgrades_in_flight.insert(key.clone()) {
            return Err(AppError::UpgradeInFlight);
        }
        let _guard = InFlightGuard {
            set: ctx.upgrades_in_flight.clone(),
            key,
        };

        let payload = UpgradePayload::new(&selection.plan.id, selection.seats);
        ctx.api.submit_upgrade(provider, owner, &payload).await?;

        // The destination screen must never observe stale seat or plan data.
        ctx.account_cache.invalidate(provider, owner);
        ctx.catalog_cache.invalidate(provider, owner);

        Ok(UpgradeOutcome::Completed {
            message: UPGRADE_SUCCESS_MESSAGE.to_string(),
            redirect_to: format!("/plan/{}/{}", provider, owner),
        })
    }
}

fn build_preview(
    catalog: &[Plan],
    account: &AccountSubscriptionState,
    selection: UpgradeSelection,
) -> UpgradePreviewResponse {
    let errors = pricing::validate_seats(&selection, account);
    let totals = pricing::totals_for(catalog, selection.plan.tier(), selection.seats);

    UpgradePreviewResponse {
        seats: selection.seats,
        can_submit: errors.is_empty(),
        errors: errors.iter().map(|error| error.to_string()).collect(),
        monthly_total: totals.monthly,
        annual_total: totals.annually,
        monthly_display: totals.monthly.map(pricing::format_price),
        annual_display: totals.annually.map(pricing::format_price),
    }
}

fn find_plan<'a>(catalog: &'a [Plan], plan_id: &str) -> AppResult<&'a Plan> {
    catalog
        .iter()
        .find(|plan| plan.id == plan_id)
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))
}
