use serde::{Deserialize, Serialize};

use crate::models::billing::{AccountSubscriptionState, Plan, TrialStatus};

/// Response payload for the plan catalog.
#[derive(Debug, Serialize)]
pub struct PlanCatalogResponse {
    pub data: Vec<Plan>,
}

/// Response payload for the account's subscription state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub plan: Plan,
    pub activated_user_count: i32,
    pub inactive_user_count: i32,
    pub trial_status: TrialStatus,
    pub has_default_payment_method: bool,
    pub pending_unverified_payment_url: Option<String>,
}

impl From<AccountSubscriptionState> for AccountResponse {
    fn from(account: AccountSubscriptionState) -> Self {
        Self {
            plan: account.current_plan,
            activated_user_count: account.activated_user_count,
            inactive_user_count: account.inactive_user_count,
            trial_status: account.trial_status,
            has_default_payment_method: account.has_default_payment_method,
            pending_unverified_payment_url: account.pending_unverified_payment_url,
        }
    }
}

/// Query parameters for the upgrade preview.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePreviewQuery {
    pub plan_id: String,
    pub seats: i32,
}

/// Query parameters for seeding the upgrade form. A plan carried over from
/// the pricing page overrides the account-derived default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpgradeFormQuery {
    pub plan_id: Option<String>,
}

/// Response payload for the freshly seeded upgrade form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeFormResponse {
    pub plan_id: String,
    pub seats: i32,
    pub preview: UpgradePreviewResponse,
}

/// Preview payload: validation outcome plus both cadence totals for the
/// same seat count, so toggling the cadence needs no resubmission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePreviewResponse {
    pub seats: i32,
    pub errors: Vec<String>,
    pub can_submit: bool,
    pub monthly_total: Option<f64>,
    pub annual_total: Option<f64>,
    pub monthly_display: Option<String>,
    pub annual_display: Option<String>,
}

/// Request payload for submitting an upgrade.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub plan_id: String,
    pub seats: i32,
    /// Explicit confirmation that a pending unverified payment method from
    /// a prior incomplete upgrade should be discarded.
    #[serde(default)]
    pub discard_pending_verification: bool,
}

/// Response payload for a completed upgrade.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeCompletedResponse {
    pub success: bool,
    pub message: String,
    pub redirect_to: String,
}

/// Response payload when a pending unverified payment method must be
/// discarded before the upgrade can proceed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerificationResponse {
    pub requires_confirmation: bool,
    pub hosted_verification_url: Option<String>,
}
