// models.rs
// Domain models for seed data (users.json) and MongoDB collections.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// User roles for authorization. Admins manage subscriptions and users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Member => "member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Member
    }
}

/// Subscription lifecycle state as stored on the user document.
///
/// `Expired` and `Cancelled` are admin-written terminal states; a stored
/// `Trial`/`Active` whose end date has passed is detected at read time by
/// the entitlement evaluator, never rewritten in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
    None,
    PendingConfirmation,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::None => "none",
            SubscriptionStatus::PendingConfirmation => "pending_confirmation",
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::None
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Monthly,
    Yearly,
    None,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
            PlanType::None => "none",
        }
    }
}

impl Default for PlanType {
    fn default() -> Self {
        PlanType::None
    }
}

/// Seed user definition as stored in users.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub display_name: String,
    pub secret: String,
    #[serde(default)]
    pub role: UserRole,
}

/// User document: authentication material plus the subscription profile.
///
/// Subscription fields are defaulted on read so documents with unset
/// fields deserialize as "absent" rather than failing the whole lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub display_name: String,
    pub secret: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub requested_plan_type: Option<PlanType>,
    #[serde(default)]
    pub trial_end_date: Option<DateTime>,
    #[serde(default)]
    pub subscription_end_date: Option<DateTime>,
    #[serde(default)]
    pub subscribed_at: Option<DateTime>,
}

/// Session document linking a token to a user and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub user_email: String,
    pub expires_at: DateTime,
}

/// Per-project bookkeeping embedded in an income when its category has
/// project tracking. A set `dues_cleared_at` means the remaining dues were
/// settled; clearing is authoritative over the amount math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreelanceDetails {
    pub client_name: String,
    #[serde(default)]
    pub client_number: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    pub project_cost: f64,
    #[serde(default)]
    pub number_of_workers: Option<i32>,
    #[serde(default)]
    pub dues_cleared_at: Option<DateTime>,
}

/// Income transaction. `amount` is the paid-to-date figure; when
/// `freelance_details` is present the income is project-tracked and
/// participates in dues computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub description: String,
    pub amount: f64,
    pub date: DateTime,
    pub category_id: ObjectId,
    #[serde(default)]
    pub client_id: Option<ObjectId>,
    #[serde(default)]
    pub freelance_details: Option<FreelanceDetails>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub description: String,
    pub amount: f64,
    pub date: DateTime,
    pub category_id: ObjectId,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

/// Income category. `has_project_tracking` gates freelance details on
/// incomes; `is_daily_fixed_income` enables the one-click daily entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub has_project_tracking: bool,
    #[serde(default)]
    pub is_daily_fixed_income: bool,
    #[serde(default)]
    pub daily_fixed_amount: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

/// Freelance client; aggregation target for paid/dues totals across its
/// linked incomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetGoal {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}
