use anyhow::{Context, Result, bail};
use chrono::{DateTime as ChronoDateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId, to_bson};
use std::time::SystemTime;

use crate::dues::{self, DuesStatus, DuesTotals};
use crate::models::{
    BudgetGoal, Client, Expense, ExpenseCategory, FreelanceDetails, Income, IncomeCategory,
};

use super::AppState;

pub async fn list_incomes(state: &AppState, user_id: &ObjectId) -> Result<Vec<Income>> {
    let mut cursor = state
        .incomes
        .find(doc! { "user_id": user_id })
        .sort(doc! { "date": -1 })
        .await?;
    let mut items = Vec::new();
    while let Some(income) = cursor.try_next().await? {
        items.push(income);
    }
    Ok(items)
}

pub async fn get_income_by_id(state: &AppState, id: &ObjectId) -> Result<Option<Income>> {
    state
        .incomes
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn create_income(
    state: &AppState,
    user_id: &ObjectId,
    description: &str,
    amount: f64,
    date: DateTime,
    category_id: &ObjectId,
    client_id: Option<ObjectId>,
    freelance_details: Option<FreelanceDetails>,
) -> Result<ObjectId> {
    let category = ensure_income_category_owned(state, category_id, user_id).await?;
    if freelance_details.is_some() && !category.has_project_tracking {
        bail!("category does not enable project tracking");
    }
    if let Some(ref cid) = client_id {
        ensure_client_owned(state, cid, user_id).await?;
    }

    let res = state
        .incomes
        .insert_one(Income {
            id: None,
            user_id: user_id.clone(),
            description: description.to_string(),
            amount,
            date,
            category_id: category_id.clone(),
            client_id,
            freelance_details,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("income insert missing _id")
}

pub async fn update_income(
    state: &AppState,
    id: &ObjectId,
    user_id: &ObjectId,
    description: &str,
    amount: f64,
    date: DateTime,
    category_id: &ObjectId,
    client_id: Option<ObjectId>,
    freelance_details: Option<FreelanceDetails>,
) -> Result<()> {
    let _ = state
        .incomes
        .find_one(doc! { "_id": id })
        .await?
        .context("income not found")?;

    let category = ensure_income_category_owned(state, category_id, user_id).await?;
    if freelance_details.is_some() && !category.has_project_tracking {
        bail!("category does not enable project tracking");
    }
    if let Some(ref cid) = client_id {
        ensure_client_owned(state, cid, user_id).await?;
    }

    state
        .incomes
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "description": description,
                "amount": amount,
                "date": date,
                "category_id": category_id,
                "client_id": client_id,
                "freelance_details": to_bson(&freelance_details)?,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

pub async fn delete_income(state: &AppState, id: &ObjectId) -> Result<()> {
    state.incomes.delete_one(doc! { "_id": id }).await?;
    Ok(())
}

/// Settle the outstanding dues of one income. Re-fetches the record, runs
/// the pure transform, and persists the result only when it changed
/// anything. Returns the post-transform record either way.
pub async fn clear_income_dues(
    state: &AppState,
    id: &ObjectId,
    now: ChronoDateTime<Utc>,
) -> Result<Income> {
    let income = get_income_by_id(state, id)
        .await?
        .context("income not found")?;

    let cleared = dues::clear_dues(&income, now);
    if dues::classify(&income) == Some(DuesStatus::DueOutstanding) {
        state
            .incomes
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "amount": cleared.amount,
                    "freelance_details.dues_cleared_at":
                        cleared.freelance_details.as_ref().and_then(|d| d.dues_cleared_at),
                    "updated_at": DateTime::from_chrono(now),
                } },
            )
            .await?;
    }
    Ok(cleared)
}

/// One-click entry for a daily-fixed-income category: records today's
/// fixed amount as a plain income.
pub async fn quick_daily_income(
    state: &AppState,
    user_id: &ObjectId,
    category_id: &ObjectId,
    now: ChronoDateTime<Utc>,
) -> Result<ObjectId> {
    let category = ensure_income_category_owned(state, category_id, user_id).await?;
    if !category.is_daily_fixed_income {
        bail!("category is not a daily fixed income");
    }
    let amount = category
        .daily_fixed_amount
        .context("category has no daily fixed amount")?;

    let description = format!("{} ({})", category.name, now.format("%Y-%m-%d"));
    create_income(
        state,
        user_id,
        &description,
        amount,
        DateTime::from_chrono(now),
        category_id,
        None,
        None,
    )
    .await
}

pub async fn list_expenses(state: &AppState, user_id: &ObjectId) -> Result<Vec<Expense>> {
    let mut cursor = state
        .expenses
        .find(doc! { "user_id": user_id })
        .sort(doc! { "date": -1 })
        .await?;
    let mut items = Vec::new();
    while let Some(expense) = cursor.try_next().await? {
        items.push(expense);
    }
    Ok(items)
}

pub async fn get_expense_by_id(state: &AppState, id: &ObjectId) -> Result<Option<Expense>> {
    state
        .expenses
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn create_expense(
    state: &AppState,
    user_id: &ObjectId,
    description: &str,
    amount: f64,
    date: DateTime,
    category_id: &ObjectId,
) -> Result<ObjectId> {
    ensure_expense_category_owned(state, category_id, user_id).await?;

    let res = state
        .expenses
        .insert_one(Expense {
            id: None,
            user_id: user_id.clone(),
            description: description.to_string(),
            amount,
            date,
            category_id: category_id.clone(),
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("expense insert missing _id")
}

pub async fn update_expense(
    state: &AppState,
    id: &ObjectId,
    user_id: &ObjectId,
    description: &str,
    amount: f64,
    date: DateTime,
    category_id: &ObjectId,
) -> Result<()> {
    ensure_expense_category_owned(state, category_id, user_id).await?;

    state
        .expenses
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "description": description,
                "amount": amount,
                "date": date,
                "category_id": category_id,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

pub async fn delete_expense(state: &AppState, id: &ObjectId) -> Result<()> {
    state.expenses.delete_one(doc! { "_id": id }).await?;
    Ok(())
}

pub async fn list_income_categories(
    state: &AppState,
    user_id: &ObjectId,
) -> Result<Vec<IncomeCategory>> {
    let mut cursor = state
        .income_categories
        .find(doc! { "user_id": user_id })
        .await?;
    let mut items = Vec::new();
    while let Some(category) = cursor.try_next().await? {
        items.push(category);
    }
    Ok(items)
}

pub async fn get_income_category_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<IncomeCategory>> {
    state
        .income_categories
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn count_income_categories(state: &AppState, user_id: &ObjectId) -> Result<usize> {
    let count = state
        .income_categories
        .count_documents(doc! { "user_id": user_id })
        .await?;
    Ok(count as usize)
}

pub async fn create_income_category(
    state: &AppState,
    user_id: &ObjectId,
    name: &str,
    description: Option<String>,
    has_project_tracking: bool,
    is_daily_fixed_income: bool,
    daily_fixed_amount: Option<f64>,
) -> Result<ObjectId> {
    if is_daily_fixed_income && daily_fixed_amount.is_none() {
        bail!("daily fixed income needs a daily amount");
    }

    let res = state
        .income_categories
        .insert_one(IncomeCategory {
            id: None,
            user_id: user_id.clone(),
            name: name.to_string(),
            description,
            has_project_tracking,
            is_daily_fixed_income,
            daily_fixed_amount,
            is_default: false,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("income category insert missing _id")
}

pub async fn update_income_category(
    state: &AppState,
    id: &ObjectId,
    name: &str,
    description: Option<String>,
    has_project_tracking: bool,
    is_daily_fixed_income: bool,
    daily_fixed_amount: Option<f64>,
) -> Result<()> {
    if is_daily_fixed_income && daily_fixed_amount.is_none() {
        bail!("daily fixed income needs a daily amount");
    }

    state
        .income_categories
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "name": name,
                "description": description,
                "has_project_tracking": has_project_tracking,
                "is_daily_fixed_income": is_daily_fixed_income,
                "daily_fixed_amount": daily_fixed_amount,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

pub async fn delete_income_category(state: &AppState, id: &ObjectId) -> Result<()> {
    let has_incomes = state
        .incomes
        .find_one(doc! { "category_id": id })
        .await?
        .is_some();
    if has_incomes {
        bail!("category has incomes; reassign them before deleting");
    }
    state.income_categories.delete_one(doc! { "_id": id }).await?;
    Ok(())
}

pub async fn list_expense_categories(
    state: &AppState,
    user_id: &ObjectId,
) -> Result<Vec<ExpenseCategory>> {
    let mut cursor = state
        .expense_categories
        .find(doc! { "user_id": user_id })
        .await?;
    let mut items = Vec::new();
    while let Some(category) = cursor.try_next().await? {
        items.push(category);
    }
    Ok(items)
}

pub async fn get_expense_category_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<ExpenseCategory>> {
    state
        .expense_categories
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn count_expense_categories(state: &AppState, user_id: &ObjectId) -> Result<usize> {
    let count = state
        .expense_categories
        .count_documents(doc! { "user_id": user_id })
        .await?;
    Ok(count as usize)
}

pub async fn create_expense_category(
    state: &AppState,
    user_id: &ObjectId,
    name: &str,
    description: Option<String>,
) -> Result<ObjectId> {
    let res = state
        .expense_categories
        .insert_one(ExpenseCategory {
            id: None,
            user_id: user_id.clone(),
            name: name.to_string(),
            description,
            is_default: false,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("expense category insert missing _id")
}

pub async fn update_expense_category(
    state: &AppState,
    id: &ObjectId,
    name: &str,
    description: Option<String>,
) -> Result<()> {
    state
        .expense_categories
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "name": name,
                "description": description,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

pub async fn delete_expense_category(state: &AppState, id: &ObjectId) -> Result<()> {
    let has_expenses = state
        .expenses
        .find_one(doc! { "category_id": id })
        .await?
        .is_some();
    if has_expenses {
        bail!("category has expenses; reassign them before deleting");
    }
    state
        .expense_categories
        .delete_one(doc! { "_id": id })
        .await?;
    Ok(())
}

pub async fn list_clients(state: &AppState, user_id: &ObjectId) -> Result<Vec<Client>> {
    let mut cursor = state.clients.find(doc! { "user_id": user_id }).await?;
    let mut items = Vec::new();
    while let Some(client) = cursor.try_next().await? {
        items.push(client);
    }
    Ok(items)
}

pub async fn get_client_by_id(state: &AppState, id: &ObjectId) -> Result<Option<Client>> {
    state
        .clients
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn create_client(
    state: &AppState,
    user_id: &ObjectId,
    name: &str,
    number: Option<String>,
    address: Option<String>,
) -> Result<ObjectId> {
    let res = state
        .clients
        .insert_one(Client {
            id: None,
            user_id: user_id.clone(),
            name: name.to_string(),
            number,
            address,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("client insert missing _id")
}

pub async fn update_client(
    state: &AppState,
    id: &ObjectId,
    name: &str,
    number: Option<String>,
    address: Option<String>,
) -> Result<()> {
    state
        .clients
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "name": name,
                "number": number,
                "address": address,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

/// Deleting a client leaves its incomes in place; they keep the embedded
/// client name in their freelance details and simply drop out of
/// per-client summaries.
pub async fn delete_client(state: &AppState, id: &ObjectId) -> Result<()> {
    state.clients.delete_one(doc! { "_id": id }).await?;
    Ok(())
}

pub struct ClientFinancialSummary {
    pub client: Client,
    pub totals: DuesTotals,
}

/// Per-client paid/outstanding totals over the user's project-tracked
/// incomes.
pub async fn client_financial_summaries(
    state: &AppState,
    user_id: &ObjectId,
) -> Result<Vec<ClientFinancialSummary>> {
    let clients = list_clients(state, user_id).await?;
    let incomes = list_incomes(state, user_id).await?;

    Ok(clients
        .into_iter()
        .map(|client| {
            let totals = client
                .id
                .as_ref()
                .map(|id| dues::aggregate(&incomes, Some(id)))
                .unwrap_or_default();
            ClientFinancialSummary { client, totals }
        })
        .collect())
}

pub async fn list_goals(state: &AppState, user_id: &ObjectId) -> Result<Vec<BudgetGoal>> {
    let mut cursor = state.goals.find(doc! { "user_id": user_id }).await?;
    let mut items = Vec::new();
    while let Some(goal) = cursor.try_next().await? {
        items.push(goal);
    }
    Ok(items)
}

pub async fn get_goal_by_id(state: &AppState, id: &ObjectId) -> Result<Option<BudgetGoal>> {
    state
        .goals
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn count_goals(state: &AppState, user_id: &ObjectId) -> Result<usize> {
    let count = state
        .goals
        .count_documents(doc! { "user_id": user_id })
        .await?;
    Ok(count as usize)
}

pub async fn create_goal(
    state: &AppState,
    user_id: &ObjectId,
    name: &str,
    target_amount: f64,
    current_amount: f64,
    description: Option<String>,
) -> Result<ObjectId> {
    let res = state
        .goals
        .insert_one(BudgetGoal {
            id: None,
            user_id: user_id.clone(),
            name: name.to_string(),
            target_amount,
            current_amount,
            description,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("goal insert missing _id")
}

pub async fn update_goal(
    state: &AppState,
    id: &ObjectId,
    name: &str,
    target_amount: f64,
    current_amount: f64,
    description: Option<String>,
) -> Result<()> {
    state
        .goals
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "name": name,
                "target_amount": target_amount,
                "current_amount": current_amount,
                "description": description,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    Ok(())
}

pub async fn delete_goal(state: &AppState, id: &ObjectId) -> Result<()> {
    state.goals.delete_one(doc! { "_id": id }).await?;
    Ok(())
}

async fn ensure_income_category_owned(
    state: &AppState,
    category_id: &ObjectId,
    user_id: &ObjectId,
) -> Result<IncomeCategory> {
    let category = state
        .income_categories
        .find_one(doc! { "_id": category_id })
        .await?
        .context("income category not found")?;
    if &category.user_id != user_id {
        bail!("income category belongs to another user");
    }
    Ok(category)
}

async fn ensure_expense_category_owned(
    state: &AppState,
    category_id: &ObjectId,
    user_id: &ObjectId,
) -> Result<ExpenseCategory> {
    let category = state
        .expense_categories
        .find_one(doc! { "_id": category_id })
        .await?
        .context("expense category not found")?;
    if &category.user_id != user_id {
        bail!("expense category belongs to another user");
    }
    Ok(category)
}

async fn ensure_client_owned(
    state: &AppState,
    client_id: &ObjectId,
    user_id: &ObjectId,
) -> Result<Client> {
    let client = state
        .clients
        .find_one(doc! { "_id": client_id })
        .await?
        .context("client not found")?;
    if &client.user_id != user_id {
        bail!("client belongs to another user");
    }
    Ok(client)
}
