// entitlement.rs
// Pure evaluation of a user's subscription entitlement from a profile
// snapshot and an injected clock. Nothing here touches the database;
// callers persist state transitions explicitly.

use chrono::{DateTime, Days, Months, Utc};

use crate::models::{PlanType, SubscriptionStatus, User};

/// Days of full access granted at signup.
pub const TRIAL_PERIOD_DAYS: u64 = 15;

/// Cap on trial-gated resources (budget goals, categories).
pub const TRIAL_ITEM_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    Active,
    TrialActive,
    TrialExpired,
    SubscriptionExpired,
    Pending,
    None,
}

impl Entitlement {
    /// Write access to budgeting features. Pending requests do not grant
    /// access by themselves.
    pub fn can_write(&self) -> bool {
        matches!(self, Entitlement::Active | Entitlement::TrialActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Entitlement::Active => "active",
            Entitlement::TrialActive => "trial_active",
            Entitlement::TrialExpired => "trial_expired",
            Entitlement::SubscriptionExpired => "subscription_expired",
            Entitlement::Pending => "pending",
            Entitlement::None => "none",
        }
    }
}

/// Evaluate the entitlement of a profile snapshot at `now`.
///
/// End dates are tested strictly: an end date equal to `now` is already
/// expired. A missing end date on an otherwise-entitled status fails
/// closed.
pub fn evaluate(profile: &User, now: DateTime<Utc>) -> Entitlement {
    match profile.subscription_status {
        SubscriptionStatus::PendingConfirmation if profile.requested_plan_type.is_some() => {
            Entitlement::Pending
        }
        SubscriptionStatus::PendingConfirmation => Entitlement::None,
        SubscriptionStatus::Active => match profile.subscription_end_date {
            Some(end) if end.to_chrono() > now => Entitlement::Active,
            _ => Entitlement::SubscriptionExpired,
        },
        SubscriptionStatus::Trial => match profile.trial_end_date {
            Some(end) if end.to_chrono() > now => Entitlement::TrialActive,
            _ => Entitlement::TrialExpired,
        },
        SubscriptionStatus::Expired => Entitlement::SubscriptionExpired,
        SubscriptionStatus::Cancelled | SubscriptionStatus::None => Entitlement::None,
    }
}

/// Shared limit test for every trial-gated resource kind.
pub fn is_trial_limit_reached(count: usize, limit: usize) -> bool {
    count >= limit
}

/// End of the trial granted at signup.
pub fn trial_end(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_days(Days::new(TRIAL_PERIOD_DAYS)).unwrap_or(now)
}

/// End of a paid subscription period starting at `now`: one calendar
/// month or one calendar year. `PlanType::None` has no period.
pub fn subscription_period_end(plan: PlanType, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let months = match plan {
        PlanType::Monthly => Months::new(1),
        PlanType::Yearly => Months::new(12),
        PlanType::None => return None,
    };
    now.checked_add_months(months)
}
