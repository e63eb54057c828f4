// state module: AppState, initialization, and re-exports of submodules.

use anyhow::Result;
use mongodb::{Client as MongoClient, Collection};
use std::env;

use crate::models::{
    BudgetGoal, Client, Expense, ExpenseCategory, Income, IncomeCategory, Session, User,
};

mod finance;
mod seed;
mod subscriptions;
mod users;

pub use finance::*;
pub use subscriptions::*;
pub use users::*;

pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day

#[derive(Clone)]
pub struct AppState {
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub incomes: Collection<Income>,
    pub expenses: Collection<Expense>,
    pub income_categories: Collection<IncomeCategory>,
    pub expense_categories: Collection<ExpenseCategory>,
    pub clients: Collection<Client>,
    pub goals: Collection<BudgetGoal>,
}

pub async fn init_state() -> Result<AppState> {
    let uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = env::var("MONGODB_DB").unwrap_or_else(|_| "pocketbudget".to_string());

    let client = MongoClient::with_uri_str(uri).await?;
    let db = client.database(&db_name);

    seed::ensure_collections(&db).await?;

    // Only seed when the database is effectively empty (no users).
    if seed::is_database_empty(&db).await? {
        let seed_users = seed::load_default_users()?;
        seed::seed_default_users(&db, &seed_users).await?;
    }

    Ok(AppState {
        users: db.collection::<User>("users"),
        sessions: db.collection::<Session>("sessions"),
        incomes: db.collection::<Income>("incomes"),
        expenses: db.collection::<Expense>("expenses"),
        income_categories: db.collection::<IncomeCategory>("income_categories"),
        expense_categories: db.collection::<ExpenseCategory>("expense_categories"),
        clients: db.collection::<Client>("clients"),
        goals: db.collection::<BudgetGoal>("goals"),
    })
}
