use serde::{Deserialize, Serialize};

/// Billing cadence of a catalog plan. `None` on the free plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingRate {
    Monthly,
    Annually,
}

/// Plan shape, computed exactly once when a catalog entry is loaded.
/// All later branching switches on this enum instead of re-deriving
/// the catalog's boolean flags at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
    Sentry,
    Team,
    Enterprise,
    Trial,
}

/// Raw catalog flags as the billing upstream reports them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanFlags {
    pub is_team_plan: bool,
    pub is_sentry_plan: bool,
    pub is_enterprise_plan: bool,
    pub is_free_plan: bool,
    pub is_pro_plan: bool,
    pub is_trial_plan: bool,
}

impl PlanFlags {
    /// Collapses the flag set into a single tier. Precedence mirrors the
    /// catalog: enterprise and team are exclusive shapes, sentry plans also
    /// report `is_pro_plan`, so they are resolved first.
    pub fn tier(&self) -> PlanTier {
        if self.is_enterprise_plan {
            PlanTier::Enterprise
        } else if self.is_team_plan {
            PlanTier::Team
        } else if self.is_sentry_plan {
            PlanTier::Sentry
        } else if self.is_trial_plan {
            PlanTier::Trial
        } else if self.is_free_plan {
            PlanTier::Basic
        } else {
            PlanTier::Pro
        }
    }
}

/// One immutable plan-catalog entry, keyed by `id`.
/// Each paid tier has exactly one monthly and one annual variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub marketing_name: String,
    pub billing_rate: Option<BillingRate>,
    /// Currency per seat per period. Annual variants carry the
    /// already-discounted per-seat rate; nothing else is applied to it.
    pub base_unit_price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub monthly_upload_limit: Option<i64>,
    /// Catalog default (and minimum) seat count for this plan.
    pub quantity: i32,
    pub trial_days: Option<i32>,
    #[serde(flatten)]
    pub flags: PlanFlags,
    #[serde(default = "default_true")]
    pub has_seats_left: bool,
    /// Stamped by `with_tier` when the catalog entry is loaded.
    #[serde(skip_deserializing)]
    pub tier: Option<PlanTier>,
}

fn default_true() -> bool {
    true
}

impl Plan {
    /// Stamps the tier once. Catalog loaders call this on every entry
    /// before the plan is handed to anything else.
    pub fn with_tier(mut self) -> Self {
        self.tier = Some(self.flags.tier());
        self
    }

    pub fn tier(&self) -> PlanTier {
        self.tier.unwrap_or_else(|| self.flags.tier())
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self.tier(), PlanTier::Basic | PlanTier::Trial)
    }
}

/// Where the account stands in its free trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrialStatus {
    NotStarted,
    Ongoing,
    Expired,
}

/// The account's current billing commitment. Mutated only by a successful
/// upgrade mutation; read-only to the pricing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSubscriptionState {
    pub current_plan: Plan,
    pub activated_user_count: i32,
    pub inactive_user_count: i32,
    pub trial_status: TrialStatus,
    pub has_default_payment_method: bool,
    /// Hosted verification URL of a prior incomplete upgrade, if one is
    /// still awaiting payment verification.
    pub pending_unverified_payment_url: Option<String>,
}

impl AccountSubscriptionState {
    pub fn is_trialing(&self) -> bool {
        self.trial_status == TrialStatus::Ongoing
    }
}

/// The upgrade form's working state: the plan under consideration and the
/// requested seat count. Seats must be re-validated whenever the plan
/// changes.
#[derive(Debug, Clone)]
pub struct UpgradeSelection {
    pub plan: Plan,
    pub seats: i32,
}
