use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::billing::{AccountSubscriptionState, Plan, TrialStatus},
};

/// Body of the upgrade mutation:
/// `{ "plan": { "value": <plan id>, "quantity": <seats> } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradePayload {
    pub plan: PlanChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanChange {
    pub value: String,
    pub quantity: i32,
}

impl UpgradePayload {
    pub fn new(plan_id: &str, seats: i32) -> Self {
        Self {
            plan: PlanChange {
                value: plan_id.to_string(),
                quantity: seats,
            },
        }
    }
}

/// The billing upstream. Usecases depend on this trait so tests can swap in
/// an in-memory double.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn fetch_catalog(&self, provider: &str, owner: &str) -> AppResult<Vec<Plan>>;
    async fn fetch_account(
        &self,
        provider: &str,
        owner: &str,
    ) -> AppResult<AccountSubscriptionState>;
    async fn submit_upgrade(
        &self,
        provider: &str,
        owner: &str,
        payload: &UpgradePayload,
    ) -> AppResult<()>;
}

/// Account details as the billing upstream reports them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDetailsBody {
    plan: Plan,
    activated_user_count: i32,
    inactive_user_count: i32,
    trial_status: TrialStatus,
    #[serde(default)]
    default_payment_method: bool,
    #[serde(default)]
    unverified_payment_methods: Vec<UnverifiedPaymentMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnverifiedPaymentMethod {
    hosted_verification_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    detail: Option<String>,
}

impl From<AccountDetailsBody> for AccountSubscriptionState {
    fn from(body: AccountDetailsBody) -> Self {
        let pending_unverified_payment_url = body
            .unverified_payment_methods
            .into_iter()
            .find_map(|method| method.hosted_verification_url);

        Self {
            current_plan: body.plan.with_tier(),
            activated_user_count: body.activated_user_count,
            inactive_user_count: body.inactive_user_count,
            trial_status: body.trial_status,
            has_default_payment_method: body.default_payment_method,
            pending_unverified_payment_url,
        }
    }
}

/// reqwest-backed client for the billing upstream.
#[derive(Clone)]
pub struct HttpBillingClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBillingClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn owner_url(&self, provider: &str, owner: &str, tail: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            urlencoding::encode(provider),
            urlencoding::encode(owner),
            tail
        )
    }
}

/// Reads the optional `{ "detail": ... }` body of a failed upstream call.
async fn upstream_failure(response: reqwest::Response) -> AppError {
    let detail = response
        .json::<UpstreamErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);
    AppError::Upstream { detail }
}

#[async_trait]
impl BillingApi for HttpBillingClient {
    async fn fetch_catalog(&self, provider: &str, owner: &str) -> AppResult<Vec<Plan>> {
        let url = self.owner_url(provider, owner, "plans");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        let plans = response.json::<Vec<Plan>>().await?;
        Ok(plans.into_iter().map(Plan::with_tier).collect())
    }

    async fn fetch_account(
        &self,
        provider: &str,
        owner: &str,
    ) -> AppResult<AccountSubscriptionState> {
        let url = self.owner_url(provider, owner, "account");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        let body = response.json::<AccountDetailsBody>().await?;
        Ok(body.into())
    }

    async fn submit_upgrade(
        &self,
        provider: &str,
        owner: &str,
        payload: &UpgradePayload,
    ) -> AppResult<()> {
        let url = self.owner_url(provider, owner, "account");
        let response = self.http.patch(&url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        Ok(())
    }
}
