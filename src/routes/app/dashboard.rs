use std::{collections::HashSet, sync::Arc};

use askama::Template;
use axum::{extract::State, http::StatusCode, response::Html};
use chrono::{DateTime as ChronoDateTime, Datelike, Months, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;

#[allow(unused_imports)]
use crate::filters;

use crate::{
    dues::{self, STALE_DUES_DAYS},
    entitlement::Entitlement,
    models::Income,
    session::SessionUser,
    state::{AppState, list_expenses, list_income_categories, list_incomes},
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    display_name: String,
    entitlement_text: String,
    can_write: bool,
    income_month: f64,
    expenses_month: f64,
    net_month: f64,
    income_change: String,
    total_dues: f64,
    potential_loss: f64,
    stale_days: i64,
    daily_income_month: f64,
    recent_incomes: Vec<ActivityRow>,
    recent_expenses: Vec<ActivityRow>,
}

struct ActivityRow {
    description: String,
    amount: f64,
    date: String,
}

pub async fn dashboard(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let incomes = list_incomes(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let expenses = list_expenses(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let categories = list_income_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let now = Utc::now();
    let current_start = month_start(now);
    let last_start = current_start
        .checked_sub_months(Months::new(1))
        .unwrap_or(current_start);

    let income_month = sum_between(&incomes, current_start, None);
    let income_last_month = sum_between(&incomes, last_start, Some(current_start));
    let expenses_month: f64 = expenses
        .iter()
        .filter(|e| e.date.to_chrono() >= current_start)
        .map(|e| e.amount)
        .sum();
    let net_month = income_month - expenses_month;

    let change = if income_last_month > 0.0 {
        (income_month - income_last_month) / income_last_month * 100.0
    } else if income_month > 0.0 {
        100.0
    } else {
        0.0
    };
    let income_change = format!("{:+.1}% vs last month", change);

    let totals = dues::aggregate(&incomes, None);
    let potential_loss = dues::potential_loss(&incomes, now, STALE_DUES_DAYS);

    let daily_category_ids: HashSet<ObjectId> = categories
        .iter()
        .filter(|c| c.is_daily_fixed_income)
        .filter_map(|c| c.id.clone())
        .collect();
    let daily_income_month: f64 = incomes
        .iter()
        .filter(|i| daily_category_ids.contains(&i.category_id))
        .filter(|i| i.date.to_chrono() >= current_start)
        .map(|i| i.amount)
        .sum();

    let verdict = current_entitlement(&session_user);

    render(DashboardTemplate {
        display_name: session_user.user().display_name.clone(),
        entitlement_text: entitlement_text(verdict).to_string(),
        can_write: verdict.can_write(),
        income_month,
        expenses_month,
        net_month,
        income_change,
        total_dues: totals.total_dues,
        potential_loss,
        stale_days: STALE_DUES_DAYS,
        daily_income_month,
        recent_incomes: incomes
            .iter()
            .take(5)
            .map(|i| ActivityRow {
                description: i.description.clone(),
                amount: i.amount,
                date: date_to_display(&i.date),
            })
            .collect(),
        recent_expenses: expenses
            .iter()
            .take(5)
            .map(|e| ActivityRow {
                description: e.description.clone(),
                amount: e.amount,
                date: date_to_display(&e.date),
            })
            .collect(),
    })
}

fn entitlement_text(verdict: Entitlement) -> &'static str {
    match verdict {
        Entitlement::Active => "Active subscription",
        Entitlement::TrialActive => "Trial active",
        Entitlement::TrialExpired => "Trial expired",
        Entitlement::SubscriptionExpired => "Subscription expired",
        Entitlement::Pending => "Plan request pending approval",
        Entitlement::None => "No subscription",
    }
}

fn month_start(now: ChronoDateTime<Utc>) -> ChronoDateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn sum_between(
    incomes: &[Income],
    from: ChronoDateTime<Utc>,
    until: Option<ChronoDateTime<Utc>>,
) -> f64 {
    incomes
        .iter()
        .filter(|income| {
            let date = income.date.to_chrono();
            date >= from && until.map(|end| date < end).unwrap_or(true)
        })
        .map(|income| income.amount)
        .sum()
}
