use anyhow::Result;
use mongodb::{
    Database,
    bson::{DateTime, doc, oid::ObjectId},
};
use std::{env, fs, time::SystemTime};

use crate::models::{ExpenseCategory, IncomeCategory, SeedUser, User};

/// Default income categories created for every new user. The flag marks
/// the category that enables per-client project tracking.
const DEFAULT_INCOME_CATEGORIES: &[(&str, &str, bool)] = &[
    ("Salary", "Regular employment income.", false),
    (
        "Freelance/Projects",
        "Income from freelance projects and similar work.",
        true,
    ),
    ("Investments", "Dividends, interest, and capital gains.", false),
    ("Gifts Received", "Money received as gifts.", false),
    ("Other Income", "Anything that fits nowhere else.", false),
];

const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &str)] = &[
    ("Food & Groceries", "Meals, groceries, and dining out."),
    ("Transportation", "Fuel, fares, and vehicle upkeep."),
    ("Housing (Rent/Mortgage)", "Rent or mortgage payments."),
    ("Utilities (Bills)", "Electricity, water, internet, phone."),
    ("Healthcare & Medical", "Medicines, consultations, insurance."),
    ("Entertainment & Leisure", "Outings, streaming, hobbies."),
    ("Shopping (General)", "Clothing and household purchases."),
    ("Education", "Courses, books, and tuition."),
    ("Personal Care", "Grooming and wellness."),
    ("Other Expenses", "Anything that fits nowhere else."),
];

pub(super) async fn is_database_empty(db: &Database) -> Result<bool> {
    let users_coll = db.collection::<User>("users");
    let count = users_coll.estimated_document_count().await?;
    Ok(count == 0)
}

pub(super) fn load_default_users() -> Result<Vec<SeedUser>> {
    let users_file = env::var("USERS_FILE").unwrap_or_else(|_| "./data/users.json".to_string());
    if let Ok(users_json) = fs::read_to_string(&users_file) {
        let users = serde_json::from_str::<Vec<SeedUser>>(&users_json)?;
        Ok(users)
    } else {
        // No seed file: start empty and rely on signup.
        Ok(Vec::new())
    }
}

pub(super) async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in [
        "users",
        "sessions",
        "incomes",
        "expenses",
        "income_categories",
        "expense_categories",
        "clients",
        "goals",
    ] {
        if !existing.iter().any(|existing_name| existing_name == name) {
            db.create_collection(name).await?;
        }
    }
    Ok(())
}

/// Seed users arrive with a pre-provisioned secret (typically the admin
/// account). They get no trial: administration does not need a budgeting
/// entitlement.
pub(super) async fn seed_default_users(db: &Database, users: &[SeedUser]) -> Result<()> {
    let users_coll = db.collection::<User>("users");
    let categories_coll = db.collection::<IncomeCategory>("income_categories");
    let expense_categories_coll = db.collection::<ExpenseCategory>("expense_categories");

    for seed_user in users {
        let existing = users_coll
            .find_one(doc! { "email": &seed_user.email })
            .await?;
        if existing.is_some() {
            continue;
        }

        let res = users_coll
            .insert_one(User {
                id: None,
                email: seed_user.email.clone(),
                display_name: seed_user.display_name.clone(),
                secret: seed_user.secret.clone(),
                role: seed_user.role.clone(),
                created_at: Some(DateTime::from_system_time(SystemTime::now())),
                subscription_status: Default::default(),
                plan_type: Default::default(),
                requested_plan_type: None,
                trial_end_date: None,
                subscription_end_date: None,
                subscribed_at: None,
            })
            .await?;
        if let Some(user_id) = res.inserted_id.as_object_id() {
            seed_categories_for_user(&categories_coll, &expense_categories_coll, &user_id).await?;
        }
    }
    Ok(())
}

/// Create the default category set for one user. Called at signup and for
/// seed users.
pub(super) async fn seed_categories_for_user(
    income_categories: &mongodb::Collection<IncomeCategory>,
    expense_categories: &mongodb::Collection<ExpenseCategory>,
    user_id: &ObjectId,
) -> Result<()> {
    let now = DateTime::from_system_time(SystemTime::now());

    for (name, description, has_project_tracking) in DEFAULT_INCOME_CATEGORIES {
        income_categories
            .insert_one(IncomeCategory {
                id: None,
                user_id: user_id.clone(),
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                has_project_tracking: *has_project_tracking,
                is_daily_fixed_income: false,
                daily_fixed_amount: None,
                is_default: true,
                created_at: Some(now),
                updated_at: None,
            })
            .await?;
    }

    for (name, description) in DEFAULT_EXPENSE_CATEGORIES {
        expense_categories
            .insert_one(ExpenseCategory {
                id: None,
                user_id: user_id.clone(),
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                is_default: true,
                created_at: Some(now),
                updated_at: None,
            })
            .await?;
    }

    Ok(())
}
