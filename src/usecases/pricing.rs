use std::fmt;

use crate::models::billing::{
    AccountSubscriptionState, BillingRate, Plan, PlanTier, UpgradeSelection,
};

/// Floor for standard per-user plans.
pub const MIN_PAID_SEATS: i32 = 2;
/// Sentry-path upgrades start at five seats.
pub const MIN_SENTRY_SEATS: i32 = 5;
/// The team plan is capped.
pub const TEAM_PLAN_MAX_SEATS: i32 = 10;

/// One rule violation from `validate_seats`. `Display` renders the exact
/// copy the dashboard shows next to the seat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatValidationError {
    TooFewSeats { minimum: i32 },
    AboveTeamCeiling { maximum: i32 },
    BelowActivatedUsers,
}

impl fmt::Display for SeatValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatValidationError::TooFewSeats { minimum } => write!(
                f,
                "You cannot purchase a per user plan for less than {} users.",
                minimum
            ),
            SeatValidationError::AboveTeamCeiling { maximum } => write!(
                f,
                "Team plan is only available for {} seats or fewer.",
                maximum
            ),
            SeatValidationError::BelowActivatedUsers => {
                write!(f, "You must deactivate more users before downgrading plans.")
            }
        }
    }
}

/// Minimum purchasable seat count for the selected plan. First match wins:
/// team plans keep the standard floor, the Sentry upgrade path starts
/// higher, everything else is a standard per-user plan.
pub fn minimum_seats(plan: &Plan) -> i32 {
    match plan.tier() {
        PlanTier::Team => MIN_PAID_SEATS,
        PlanTier::Sentry => MIN_SENTRY_SEATS,
        _ => MIN_PAID_SEATS,
    }
}

/// Seat ceiling, if the selected plan has one.
pub fn maximum_seats(plan: &Plan) -> Option<i32> {
    match plan.tier() {
        PlanTier::Team => Some(TEAM_PLAN_MAX_SEATS),
        _ => None,
    }
}

/// Evaluates every seat rule in order; multiple violations may be returned
/// at once and callers display the first. The downgrade rule is suspended
/// while the account's trial is ongoing.
pub fn validate_seats(
    selection: &UpgradeSelection,
    account: &AccountSubscriptionState,
) -> Vec<SeatValidationError> {
    let mut errors = Vec::new();

    let minimum = minimum_seats(&selection.plan);
    if selection.seats < minimum {
        errors.push(SeatValidationError::TooFewSeats { minimum });
    }

    if let Some(maximum) = maximum_seats(&selection.plan) {
        if selection.seats > maximum {
            errors.push(SeatValidationError::AboveTeamCeiling { maximum });
        }
    }

    if selection.seats < account.activated_user_count && !account.is_trialing() {
        errors.push(SeatValidationError::BelowActivatedUsers);
    }

    errors
}

/// Display message for the first applicable violation, if any.
pub fn first_message(errors: &[SeatValidationError]) -> Option<String> {
    errors.first().map(|error| error.to_string())
}

/// Total for a plan variant at a seat count. The catalog's per-seat rate is
/// authoritative for both cadences; annual variants already carry the
/// discounted rate, so this is plain multiplication.
pub fn price_for(plan: &Plan, seats: i32) -> f64 {
    plan.base_unit_price * f64::from(seats)
}

/// Finds the catalog variant of a tier at a given cadence.
pub fn variant_for(catalog: &[Plan], tier: PlanTier, rate: BillingRate) -> Option<&Plan> {
    catalog
        .iter()
        .find(|plan| plan.tier() == tier && plan.billing_rate == Some(rate))
}

/// Monthly and annual totals for the same seat count, so a cadence toggle
/// can preview the alternate total without recomputing anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceTotals {
    pub monthly: Option<f64>,
    pub annually: Option<f64>,
}

pub fn totals_for(catalog: &[Plan], tier: PlanTier, seats: i32) -> CadenceTotals {
    CadenceTotals {
        monthly: variant_for(catalog, tier, BillingRate::Monthly)
            .map(|plan| price_for(plan, seats)),
        annually: variant_for(catalog, tier, BillingRate::Annually)
            .map(|plan| price_for(plan, seats)),
    }
}

/// Renders a currency amount the way the dashboard displays it: whole
/// dollars without decimals, fractional amounts with two.
pub fn format_price(amount: f64) -> String {
    if (amount - amount.round()).abs() < f64::EPSILON {
        format!("${}", amount.round() as i64)
    } else {
        format!("${:.2}", amount)
    }
}

/// Seeds the upgrade form. A caller-provided plan wins; otherwise an
/// account on a paid plan keeps it, and everyone else starts on Pro-annual
/// at the catalog minimum. Returns `None` only when the catalog is missing
/// the Pro-annual variant entirely.
pub fn resolve_default_selection(
    account: &AccountSubscriptionState,
    catalog: &[Plan],
    preselected: Option<&Plan>,
) -> Option<UpgradeSelection> {
    let plan = match preselected {
        Some(plan) => plan.clone(),
        None if account.current_plan.is_paid() => account.current_plan.clone(),
        None => variant_for(catalog, PlanTier::Pro, BillingRate::Annually)?.clone(),
    };

    let seats = if account.current_plan.is_paid() {
        account.activated_user_count.max(minimum_seats(&plan))
    } else {
        plan.quantity.max(minimum_seats(&plan))
    };

    Some(UpgradeSelection { plan, seats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::billing::{PlanFlags, TrialStatus};

    fn plan(id: &str, rate: BillingRate, price: f64, tier: PlanTier) -> Plan {
        let mut flags = PlanFlags::default();
        match tier {
            PlanTier::Team => flags.is_team_plan = true,
            PlanTier::Sentry => {
                flags.is_sentry_plan = true;
                flags.is_pro_plan = true;
            }
            PlanTier::Pro => flags.is_pro_plan = true,
            PlanTier::Basic => flags.is_free_plan = true,
            PlanTier::Trial => flags.is_trial_plan = true,
            PlanTier::Enterprise => flags.is_enterprise_plan = true,
        }
        Plan {
            id: id.to_string(),
            marketing_name: id.to_string(),
            billing_rate: Some(rate),
            base_unit_price: price,
            benefits: Vec::new(),
            monthly_upload_limit: None,
            quantity: 2,
            trial_days: None,
            flags,
            has_seats_left: true,
            tier: None,
        }
        .with_tier()
    }

    fn free_plan() -> Plan {
        let mut plan = plan("users-basic", BillingRate::Monthly, 0.0, PlanTier::Basic);
        plan.billing_rate = None;
        plan
    }

    fn account(current: Plan, activated: i32, trial: TrialStatus) -> AccountSubscriptionState {
        AccountSubscriptionState {
            current_plan: current,
            activated_user_count: activated,
            inactive_user_count: 0,
            trial_status: trial,
            has_default_payment_method: true,
            pending_unverified_payment_url: None,
        }
    }

    fn catalog() -> Vec<Plan> {
        vec![
            free_plan(),
            plan("users-pr-inappm", BillingRate::Monthly, 12.0, PlanTier::Pro),
            plan("users-pr-inappy", BillingRate::Annually, 10.0, PlanTier::Pro),
            plan("users-sentrym", BillingRate::Monthly, 12.0, PlanTier::Sentry),
            plan("users-sentryy", BillingRate::Annually, 9.0, PlanTier::Sentry),
            plan("users-teamm", BillingRate::Monthly, 6.0, PlanTier::Team),
            plan("users-teamy", BillingRate::Annually, 5.0, PlanTier::Team),
        ]
    }

    #[test]
    fn minimum_seats_per_tier() {
        let catalog = catalog();
        assert_eq!(minimum_seats(variant_for(&catalog, PlanTier::Team, BillingRate::Monthly).unwrap()), 2);
        assert_eq!(minimum_seats(variant_for(&catalog, PlanTier::Sentry, BillingRate::Monthly).unwrap()), 5);
        assert_eq!(minimum_seats(variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly).unwrap()), 2);
    }

    #[test]
    fn seats_below_minimum_always_fail() {
        let catalog = catalog();
        let account = account(free_plan(), 0, TrialStatus::NotStarted);
        for (tier, rate) in [
            (PlanTier::Pro, BillingRate::Monthly),
            (PlanTier::Sentry, BillingRate::Annually),
            (PlanTier::Team, BillingRate::Monthly),
        ] {
            let plan = variant_for(&catalog, tier, rate).unwrap().clone();
            let minimum = minimum_seats(&plan);
            let selection = UpgradeSelection {
                plan,
                seats: minimum - 1,
            };
            let errors = validate_seats(&selection, &account);
            assert!(
                matches!(errors.first(), Some(SeatValidationError::TooFewSeats { .. })),
                "tier {:?} accepted {} seats",
                tier,
                minimum - 1
            );
        }
    }

    #[test]
    fn minimum_seats_message_copy() {
        let error = SeatValidationError::TooFewSeats { minimum: 5 };
        assert_eq!(
            error.to_string(),
            "You cannot purchase a per user plan for less than 5 users."
        );
    }

    #[test]
    fn team_plan_seat_ceiling() {
        let catalog = catalog();
        let team = variant_for(&catalog, PlanTier::Team, BillingRate::Monthly)
            .unwrap()
            .clone();
        let account = account(free_plan(), 0, TrialStatus::NotStarted);

        let ten = UpgradeSelection {
            plan: team.clone(),
            seats: 10,
        };
        assert!(validate_seats(&ten, &account).is_empty());

        let eleven = UpgradeSelection {
            plan: team,
            seats: 11,
        };
        let errors = validate_seats(&eleven, &account);
        assert_eq!(
            errors,
            vec![SeatValidationError::AboveTeamCeiling { maximum: 10 }]
        );
        assert_eq!(
            first_message(&errors).unwrap(),
            "Team plan is only available for 10 seats or fewer."
        );
    }

    #[test]
    fn pro_plan_has_no_ceiling() {
        let catalog = catalog();
        let pro = variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly)
            .unwrap()
            .clone();
        assert_eq!(maximum_seats(&pro), None);
        let selection = UpgradeSelection {
            plan: pro,
            seats: 5000,
        };
        let account = account(free_plan(), 0, TrialStatus::NotStarted);
        assert!(validate_seats(&selection, &account).is_empty());
    }

    #[test]
    fn downgrade_below_activated_users_is_rejected() {
        let catalog = catalog();
        let pro_monthly = variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly)
            .unwrap()
            .clone();
        let account = account(pro_monthly.clone(), 7, TrialStatus::NotStarted);

        let six = UpgradeSelection {
            plan: pro_monthly.clone(),
            seats: 6,
        };
        let errors = validate_seats(&six, &account);
        assert_eq!(errors, vec![SeatValidationError::BelowActivatedUsers]);
        assert!(
            first_message(&errors)
                .unwrap()
                .to_lowercase()
                .contains("deactivate more users before downgrading plans")
        );

        let twenty = UpgradeSelection {
            plan: pro_monthly,
            seats: 20,
        };
        assert!(validate_seats(&twenty, &account).is_empty());
    }

    #[test]
    fn ongoing_trial_suspends_the_downgrade_rule() {
        let catalog = catalog();
        let pro_monthly = variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly)
            .unwrap()
            .clone();
        let trialing = account(pro_monthly.clone(), 7, TrialStatus::Ongoing);
        let selection = UpgradeSelection {
            plan: pro_monthly.clone(),
            seats: 2,
        };
        assert!(validate_seats(&selection, &trialing).is_empty());

        // The exemption ends with the trial.
        let expired = account(pro_monthly.clone(), 7, TrialStatus::Expired);
        let selection = UpgradeSelection {
            plan: pro_monthly,
            seats: 2,
        };
        assert_eq!(
            validate_seats(&selection, &expired),
            vec![SeatValidationError::BelowActivatedUsers]
        );
    }

    #[test]
    fn minimum_violation_is_displayed_first_when_both_fire() {
        let catalog = catalog();
        let sentry = variant_for(&catalog, PlanTier::Sentry, BillingRate::Monthly)
            .unwrap()
            .clone();
        let account = account(sentry.clone(), 4, TrialStatus::NotStarted);
        let selection = UpgradeSelection {
            plan: sentry,
            seats: 3,
        };
        let errors = validate_seats(&selection, &account);
        assert_eq!(
            errors,
            vec![
                SeatValidationError::TooFewSeats { minimum: 5 },
                SeatValidationError::BelowActivatedUsers,
            ]
        );
        assert!(first_message(&errors).unwrap().starts_with("You cannot purchase"));
    }

    #[test]
    fn price_is_linear_in_seats() {
        let catalog = catalog();
        let pro = variant_for(&catalog, PlanTier::Pro, BillingRate::Annually).unwrap();
        for n in [1, 3, 8, 21] {
            assert_eq!(price_for(pro, 2 * n), 2.0 * price_for(pro, n));
        }
    }

    #[test]
    fn cadence_toggle_round_trips_exactly() {
        let catalog = catalog();
        let totals = totals_for(&catalog, PlanTier::Pro, 10);
        let again = totals_for(&catalog, PlanTier::Pro, 10);
        assert_eq!(totals.monthly, again.monthly);
        assert_eq!(totals.annually, again.annually);
    }

    #[test]
    fn pro_totals_match_display_fixtures() {
        let catalog = catalog();
        let totals = totals_for(&catalog, PlanTier::Pro, 10);
        assert_eq!(format_price(totals.annually.unwrap()), "$100");
        assert_eq!(format_price(totals.monthly.unwrap()), "$120");
    }

    #[test]
    fn sentry_annual_uses_the_catalog_rate_directly() {
        // 21 seats at the catalog's $9 annual rate; no locally invented
        // discount arithmetic on top.
        let catalog = catalog();
        let sentry = variant_for(&catalog, PlanTier::Sentry, BillingRate::Annually).unwrap();
        assert_eq!(format_price(price_for(sentry, 21)), "$189");
    }

    #[test]
    fn fractional_rates_keep_two_decimals() {
        assert_eq!(format_price(10.5), "$10.50");
        assert_eq!(format_price(0.0), "$0");
    }

    #[test]
    fn default_selection_for_free_account_is_pro_annual() {
        let catalog = catalog();
        let account = account(free_plan(), 1, TrialStatus::NotStarted);
        let selection = resolve_default_selection(&account, &catalog, None).unwrap();
        assert_eq!(selection.plan.id, "users-pr-inappy");
        assert_eq!(selection.seats, 2);
    }

    #[test]
    fn default_selection_keeps_the_current_paid_plan() {
        let catalog = catalog();
        let pro_monthly = variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly)
            .unwrap()
            .clone();
        let account = account(pro_monthly.clone(), 7, TrialStatus::NotStarted);
        let selection = resolve_default_selection(&account, &catalog, None).unwrap();
        assert_eq!(selection.plan.id, "users-pr-inappm");
        assert_eq!(selection.seats, 7);
    }

    #[test]
    fn default_selection_raises_seats_to_the_tier_minimum() {
        let catalog = catalog();
        let sentry = variant_for(&catalog, PlanTier::Sentry, BillingRate::Annually)
            .unwrap()
            .clone();
        let account = account(sentry.clone(), 3, TrialStatus::NotStarted);
        let selection = resolve_default_selection(&account, &catalog, None).unwrap();
        assert_eq!(selection.seats, 5);
    }

    #[test]
    fn preselected_plan_overrides_the_default() {
        let catalog = catalog();
        let team = variant_for(&catalog, PlanTier::Team, BillingRate::Annually).unwrap();
        let account = account(free_plan(), 1, TrialStatus::NotStarted);
        let selection = resolve_default_selection(&account, &catalog, Some(team)).unwrap();
        assert_eq!(selection.plan.id, "users-teamy");
        assert_eq!(selection.seats, 2);
    }

    #[test]
    fn validation_depends_on_the_selected_plan_not_the_current_one() {
        // Switching the selection from Pro to Sentry must re-trigger the
        // five-seat floor even though four seats were fine on Pro.
        let catalog = catalog();
        let pro = variant_for(&catalog, PlanTier::Pro, BillingRate::Monthly)
            .unwrap()
            .clone();
        let sentry = variant_for(&catalog, PlanTier::Sentry, BillingRate::Monthly)
            .unwrap()
            .clone();
        let account = account(pro.clone(), 2, TrialStatus::NotStarted);

        let on_pro = UpgradeSelection {
            plan: pro,
            seats: 4,
        };
        assert!(validate_seats(&on_pro, &account).is_empty());

        let on_sentry = UpgradeSelection {
            plan: sentry,
            seats: 4,
        };
        assert_eq!(
            validate_seats(&on_sentry, &account),
            vec![SeatValidationError::TooFewSeats { minimum: 5 }]
        );
    }
}
