use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[allow(unused_imports)]
use crate::filters;

use crate::{
    session::SessionUser,
    state::{
        AppState, create_expense, delete_expense, get_expense_by_id, list_expense_categories,
        list_expenses, update_expense,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "expenses/index.html")]
struct ExpensesIndexTemplate {
    rows: Vec<ExpenseRow>,
    can_write: bool,
}

struct ExpenseRow {
    id: String,
    description: String,
    date: String,
    category: String,
    amount: f64,
}

#[derive(Template)]
#[template(path = "expenses/form.html")]
struct ExpenseFormTemplate {
    action: String,
    description: String,
    amount: String,
    date: String,
    categories: Vec<SimpleOption>,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct ExpenseFormData {
    description: String,
    amount: String,
    date: String,
    category_id: String,
}

pub async fn expenses_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let expenses = list_expenses(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let categories = list_expense_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let category_names = build_lookup_map(
        categories
            .iter()
            .filter_map(|c| c.id.clone().map(|id| (id, c.name.clone())))
            .collect(),
    );

    let rows = expenses
        .into_iter()
        .filter_map(|expense| {
            expense.id.map(|id| ExpenseRow {
                id: id.to_hex(),
                description: expense.description.clone(),
                date: date_to_display(&expense.date),
                category: category_names
                    .get(&expense.category_id)
                    .cloned()
                    .unwrap_or_default(),
                amount: expense.amount,
            })
        })
        .collect();

    render(ExpensesIndexTemplate {
        rows,
        can_write: current_entitlement(&session_user).can_write(),
    })
}

pub async fn expenses_new(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();
    let categories = list_expense_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    render(ExpenseFormTemplate {
        action: "/expenses".into(),
        description: String::new(),
        amount: "0".into(),
        date: String::new(),
        categories: expense_category_options(&categories, None),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn expenses_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ExpenseFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let amount = match parse_f64_field(&form.amount, "amount") {
        Ok(v) => v,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let date = match parse_datetime_field(&form.date, "date") {
        Ok(dt) => dt,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let category_id = match parse_object_id(&form.category_id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match create_expense(
        &state,
        &user_id,
        form.description.trim(),
        amount,
        date,
        &category_id,
    )
    .await
    {
        Ok(_) => Redirect::to("/expenses").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn expenses_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();

    let object_id = parse_object_id(&id, "expense").map_err(|_| StatusCode::BAD_REQUEST)?;
    let expense = get_expense_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&expense.user_id, &session_user)?;

    let categories = list_expense_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    render(ExpenseFormTemplate {
        action: format!("/expenses/{}/update", id),
        description: expense.description.clone(),
        amount: expense.amount.to_string(),
        date: datetime_to_string(&expense.date),
        categories: expense_category_options(&categories, Some(&expense.category_id)),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn expenses_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ExpenseFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "expense") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_expense_by_id(&state, &object_id).await {
        Ok(Some(expense)) => ensure_owned(&expense.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    let amount = match parse_f64_field(&form.amount, "amount") {
        Ok(v) => v,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let date = match parse_datetime_field(&form.date, "date") {
        Ok(dt) => dt,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let category_id = match parse_object_id(&form.category_id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match update_expense(
        &state,
        &object_id,
        &user_id,
        form.description.trim(),
        amount,
        date,
        &category_id,
    )
    .await
    {
        Ok(_) => Redirect::to("/expenses").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn expenses_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "expense") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_expense_by_id(&state, &object_id).await {
        Ok(Some(expense)) => ensure_owned(&expense.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_expense(&state, &object_id).await {
        Ok(_) => Redirect::to("/expenses").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
