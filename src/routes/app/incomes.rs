use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

#[allow(unused_imports)]
use crate::filters;

use crate::{
    dues::{self, DuesStatus},
    models::{FreelanceDetails, Income},
    session::SessionUser,
    state::{
        AppState, clear_income_dues, create_income, delete_income, get_client_by_id,
        get_income_by_id, list_clients, list_income_categories, list_incomes, quick_daily_income,
        update_income,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "incomes/index.html")]
struct IncomesIndexTemplate {
    rows: Vec<IncomeRow>,
    daily_categories: Vec<SimpleOption>,
    can_write: bool,
}

struct IncomeRow {
    id: String,
    description: String,
    date: String,
    category: String,
    amount: f64,
    project: bool,
    client_name: String,
    project_cost: f64,
    due_amount: f64,
    status: String,
    cleared_at: String,
    can_clear: bool,
}

#[derive(Template)]
#[template(path = "incomes/form.html")]
struct IncomeFormTemplate {
    action: String,
    description: String,
    amount: String,
    date: String,
    categories: Vec<SimpleOption>,
    clients: Vec<SimpleOption>,
    client_name: String,
    client_number: String,
    client_address: String,
    project_cost: String,
    number_of_workers: String,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct IncomeFormData {
    description: String,
    amount: String,
    date: String,
    category_id: String,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    client_number: Option<String>,
    #[serde(default)]
    client_address: Option<String>,
    #[serde(default)]
    project_cost: Option<String>,
    #[serde(default)]
    number_of_workers: Option<String>,
}

#[derive(Deserialize)]
pub struct QuickDailyFormData {
    category_id: String,
}

pub async fn incomes_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let incomes = list_incomes(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let categories = list_income_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let category_names = build_lookup_map(
        categories
            .iter()
            .filter_map(|c| c.id.clone().map(|id| (id, c.name.clone())))
            .collect(),
    );
    let daily_categories = income_category_options(
        &categories
            .iter()
            .filter(|c| c.is_daily_fixed_income && c.daily_fixed_amount.is_some())
            .cloned()
            .collect::<Vec<_>>(),
        None,
    );

    let can_write = current_entitlement(&session_user).can_write();

    let rows = incomes
        .into_iter()
        .filter_map(|income| {
            let id = income.id.clone()?;
            let status = dues::classify(&income);
            let details = income.freelance_details.as_ref();
            Some(IncomeRow {
                id: id.to_hex(),
                description: income.description.clone(),
                date: date_to_display(&income.date),
                category: category_names
                    .get(&income.category_id)
                    .cloned()
                    .unwrap_or_default(),
                amount: income.amount,
                project: details.is_some(),
                client_name: details.map(|d| d.client_name.clone()).unwrap_or_default(),
                project_cost: details.map(|d| d.project_cost).unwrap_or(0.0),
                due_amount: dues::due_amount(&income),
                status: status.map(|s| s.as_str().replace('_', " ")).unwrap_or_default(),
                cleared_at: details
                    .and_then(|d| d.dues_cleared_at.as_ref())
                    .map(date_to_display)
                    .unwrap_or_default(),
                can_clear: can_write && status == Some(DuesStatus::DueOutstanding),
            })
        })
        .collect();

    render(IncomesIndexTemplate {
        rows,
        daily_categories,
        can_write,
    })
}

pub async fn incomes_new(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let categories = list_income_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let clients = list_clients(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    render(IncomeFormTemplate {
        action: "/incomes".into(),
        description: String::new(),
        amount: "0".into(),
        date: String::new(),
        categories: income_category_options(&categories, None),
        clients: client_options(&clients, None),
        client_name: String::new(),
        client_number: String::new(),
        client_address: String::new(),
        project_cost: String::new(),
        number_of_workers: String::new(),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn incomes_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<IncomeFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let parsed = match parse_income_form(&state, &user_id, &form, None).await {
        Ok(parsed) => parsed,
        Err(status) => return status.into_response(),
    };

    match create_income(
        &state,
        &user_id,
        form.description.trim(),
        parsed.amount,
        parsed.date,
        &parsed.category_id,
        parsed.client_id,
        parsed.freelance_details,
    )
    .await
    {
        Ok(_) => Redirect::to("/incomes").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn incomes_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let object_id = parse_object_id(&id, "income").map_err(|_| StatusCode::BAD_REQUEST)?;
    let income = get_income_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&income.user_id, &session_user)?;

    let categories = list_income_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let clients = list_clients(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let details = income.freelance_details.as_ref();
    render(IncomeFormTemplate {
        action: format!("/incomes/{}/update", id),
        description: income.description.clone(),
        amount: income.amount.to_string(),
        date: datetime_to_string(&income.date),
        categories: income_category_options(&categories, Some(&income.category_id)),
        clients: client_options(&clients, income.client_id.as_ref()),
        client_name: details.map(|d| d.client_name.clone()).unwrap_or_default(),
        client_number: details
            .and_then(|d| d.client_number.clone())
            .unwrap_or_default(),
        client_address: details
            .and_then(|d| d.client_address.clone())
            .unwrap_or_default(),
        project_cost: details
            .map(|d| d.project_cost.to_string())
            .unwrap_or_default(),
        number_of_workers: details
            .and_then(|d| d.number_of_workers)
            .map(|n| n.to_string())
            .unwrap_or_default(),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn incomes_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<IncomeFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "income") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let existing = match get_income_by_id(&state, &object_id).await {
        Ok(Some(income)) => income,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    if let Err(status) = ensure_owned(&existing.user_id, &session_user) {
        return status.into_response();
    }

    let parsed = match parse_income_form(&state, &user_id, &form, Some(&existing)).await {
        Ok(parsed) => parsed,
        Err(status) => return status.into_response(),
    };

    match update_income(
        &state,
        &object_id,
        &user_id,
        form.description.trim(),
        parsed.amount,
        parsed.date,
        &parsed.category_id,
        parsed.client_id,
        parsed.freelance_details,
    )
    .await
    {
        Ok(_) => Redirect::to("/incomes").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn incomes_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "income") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_income_by_id(&state, &object_id).await {
        Ok(Some(income)) => ensure_owned(&income.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_income(&state, &object_id).await {
        Ok(_) => Redirect::to("/incomes").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Settle the outstanding dues of one income. The record is re-fetched
/// here so a stale page cannot resurrect already-cleared dues.
pub async fn incomes_clear_dues(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "income") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_income_by_id(&state, &object_id).await {
        Ok(Some(income)) => ensure_owned(&income.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match clear_income_dues(&state, &object_id, Utc::now()).await {
        Ok(_) => Redirect::to("/incomes").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn incomes_quick_daily(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<QuickDailyFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let category_id = match parse_object_id(&form.category_id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match quick_daily_income(&state, &user_id, &category_id, Utc::now()).await {
        Ok(_) => Redirect::to("/incomes").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

struct ParsedIncomeForm {
    amount: f64,
    date: mongodb::bson::DateTime,
    category_id: ObjectId,
    client_id: Option<ObjectId>,
    freelance_details: Option<FreelanceDetails>,
}

/// Shared field validation for create and update. Project tracking needs
/// a cost plus a client name (typed in or taken from the linked client);
/// an edit keeps the existing `dues_cleared_at` so updating a cleared
/// project cannot silently reopen its dues.
async fn parse_income_form(
    state: &AppState,
    user_id: &ObjectId,
    form: &IncomeFormData,
    existing: Option<&Income>,
) -> Result<ParsedIncomeForm, StatusCode> {
    let amount =
        parse_f64_field(&form.amount, "amount").map_err(|_| StatusCode::BAD_REQUEST)?;
    let date =
        parse_datetime_field(&form.date, "date").map_err(|_| StatusCode::BAD_REQUEST)?;
    let category_id =
        parse_object_id(&form.category_id, "category").map_err(|_| StatusCode::BAD_REQUEST)?;
    let client_id = parse_optional_object_id(form.client_id.clone(), "client")
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let project_cost = parse_optional_f64_field(form.project_cost.clone(), "project cost")
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let number_of_workers =
        parse_optional_i32_field(form.number_of_workers.clone(), "number of workers")
            .map_err(|_| StatusCode::BAD_REQUEST)?;

    let freelance_details = match project_cost {
        Some(cost) => {
            let client_name = match clean_opt(form.client_name.clone()) {
                Some(name) => Some(name),
                None => match client_id {
                    Some(ref cid) => get_client_by_id(state, cid)
                        .await
                        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                        .filter(|c| &c.user_id == user_id)
                        .map(|c| c.name),
                    None => None,
                },
            };
            let Some(client_name) = client_name else {
                // Project tracking without any client reference.
                return Err(StatusCode::BAD_REQUEST);
            };
            Some(FreelanceDetails {
                client_name,
                client_number: clean_opt(form.client_number.clone()),
                client_address: clean_opt(form.client_address.clone()),
                project_cost: cost,
                number_of_workers,
                dues_cleared_at: existing
                    .and_then(|income| income.freelance_details.as_ref())
                    .and_then(|details| details.dues_cleared_at),
            })
        }
        None => None,
    };

    Ok(ParsedIncomeForm {
        amount,
        date,
        category_id,
        client_id,
        freelance_details,
    })
}
