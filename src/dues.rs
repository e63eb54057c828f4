// dues.rs
// Pure dues arithmetic over income snapshots: per-record classification,
// paid/outstanding aggregation, the stale-dues partition shown on the
// dashboard, and the clear-dues transform. Persistence of any result is
// the caller's job.

use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{self, oid::ObjectId};

use crate::models::Income;

/// Outstanding dues older than this many days count as potential loss.
pub const STALE_DUES_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuesStatus {
    PaidInFull,
    DueOutstanding,
    DueCleared,
}

impl DuesStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuesStatus::PaidInFull => "paid_in_full",
            DuesStatus::DueOutstanding => "due_outstanding",
            DuesStatus::DueCleared => "due_cleared",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DuesTotals {
    pub total_paid: f64,
    pub total_dues: f64,
}

/// Classify a project-tracked income. Returns `None` for incomes without
/// freelance details; they stay plain incomes and never enter project
/// aggregation.
pub fn classify(income: &Income) -> Option<DuesStatus> {
    let details = income.freelance_details.as_ref()?;
    if details.dues_cleared_at.is_some() {
        // Clearing is authoritative even when cost > amount.
        return Some(DuesStatus::DueCleared);
    }
    if details.project_cost - income.amount > 0.0 {
        Some(DuesStatus::DueOutstanding)
    } else {
        Some(DuesStatus::PaidInFull)
    }
}

/// Unpaid remainder of a project-tracked income, clamped at zero so a
/// project cost edited below the paid amount never yields negative dues.
pub fn due_amount(income: &Income) -> f64 {
    income
        .freelance_details
        .as_ref()
        .map(|d| (d.project_cost - income.amount).max(0.0))
        .unwrap_or(0.0)
}

/// Aggregate paid and outstanding totals over project-tracked incomes,
/// optionally scoped to one client. Order-independent: shuffling the
/// input changes neither total.
pub fn aggregate(incomes: &[Income], client_filter: Option<&ObjectId>) -> DuesTotals {
    let mut totals = DuesTotals::default();
    for income in incomes {
        if income.freelance_details.is_none() {
            continue;
        }
        if let Some(client_id) = client_filter {
            if income.client_id.as_ref() != Some(client_id) {
                continue;
            }
        }
        totals.total_paid += income.amount;
        if classify(income) == Some(DuesStatus::DueOutstanding) {
            totals.total_dues += due_amount(income);
        }
    }
    totals
}

/// Outstanding dues whose income date is strictly older than the
/// staleness window. Callers pass [`STALE_DUES_DAYS`] unless they have a
/// different policy.
pub fn potential_loss(incomes: &[Income], now: DateTime<Utc>, stale_days: i64) -> f64 {
    let cutoff = now - Duration::days(stale_days);
    incomes
        .iter()
        .filter(|income| classify(income) == Some(DuesStatus::DueOutstanding))
        .filter(|income| income.date.to_chrono() < cutoff)
        .map(due_amount)
        .sum()
}

/// Settle the remaining dues of a project-tracked income: the paid amount
/// becomes the full project cost and the clearing instant is recorded.
/// A record that is not project-tracked, already cleared, or has nothing
/// outstanding is returned unchanged.
pub fn clear_dues(income: &Income, now: DateTime<Utc>) -> Income {
    let mut cleared = income.clone();
    if let Some(details) = cleared.freelance_details.as_mut() {
        if details.dues_cleared_at.is_none() && details.project_cost - cleared.amount > 0.0 {
            cleared.amount = details.project_cost;
            details.dues_cleared_at = Some(bson::DateTime::from_chrono(now));
        }
    }
    cleared
}
