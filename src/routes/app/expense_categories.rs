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
    entitlement::{Entitlement, TRIAL_ITEM_LIMIT, is_trial_limit_reached},
    session::SessionUser,
    state::{
        AppState, count_expense_categories, create_expense_category, delete_expense_category,
        get_expense_category_by_id, list_expense_categories, update_expense_category,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "expense_categories/index.html")]
struct ExpenseCategoriesIndexTemplate {
    rows: Vec<CategoryRow>,
    can_write: bool,
    trial_limit_reached: bool,
    trial_limit: usize,
}

struct CategoryRow {
    id: String,
    name: String,
    description: String,
    is_default: bool,
}

#[derive(Template)]
#[template(path = "expense_categories/form.html")]
struct ExpenseCategoryFormTemplate {
    action: String,
    name: String,
    description: String,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct ExpenseCategoryFormData {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

async fn trial_limit_reached(
    state: &AppState,
    session_user: &SessionUser,
) -> Result<bool, StatusCode> {
    if current_entitlement(session_user) != Entitlement::TrialActive {
        return Ok(false);
    }
    let count = count_expense_categories(state, session_user.user_id())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(is_trial_limit_reached(count, TRIAL_ITEM_LIMIT))
}

pub async fn expense_categories_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();
    let categories = list_expense_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let rows = categories
        .into_iter()
        .filter_map(|category| {
            category.id.map(|id| CategoryRow {
                id: id.to_hex(),
                name: category.name.clone(),
                description: category.description.clone().unwrap_or_default(),
                is_default: category.is_default,
            })
        })
        .collect();

    render(ExpenseCategoriesIndexTemplate {
        rows,
        can_write: current_entitlement(&session_user).can_write(),
        trial_limit_reached: trial_limit_reached(&state, &session_user).await?,
        trial_limit: TRIAL_ITEM_LIMIT,
    })
}

pub async fn expense_categories_new(
    _session_user: SessionUser,
) -> Result<Html<String>, StatusCode> {
    render(ExpenseCategoryFormTemplate {
        action: "/expense-categories".into(),
        name: String::new(),
        description: String::new(),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn expense_categories_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ExpenseCategoryFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }
    match trial_limit_reached(&state, &session_user).await {
        Ok(true) => return StatusCode::FORBIDDEN.into_response(),
        Ok(false) => {}
        Err(status) => return status.into_response(),
    }

    match create_expense_category(
        &state,
        &user_id,
        form.name.trim(),
        clean_opt(form.description),
    )
    .await
    {
        Ok(_) => Redirect::to("/expense-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn expense_categories_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let object_id = parse_object_id(&id, "category").map_err(|_| StatusCode::BAD_REQUEST)?;
    let category = get_expense_category_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&category.user_id, &session_user)?;

    render(ExpenseCategoryFormTemplate {
        action: format!("/expense-categories/{}/update", id),
        name: category.name.clone(),
        description: category.description.clone().unwrap_or_default(),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn expense_categories_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ExpenseCategoryFormData>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_expense_category_by_id(&state, &object_id).await {
        Ok(Some(category)) => ensure_owned(&category.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match update_expense_category(
        &state,
        &object_id,
        form.name.trim(),
        clean_opt(form.description),
    )
    .await
    {
        Ok(_) => Redirect::to("/expense-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn expense_categories_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_expense_category_by_id(&state, &object_id).await {
        Ok(Some(category)) => ensure_owned(&category.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_expense_category(&state, &object_id).await {
        Ok(_) => Redirect::to("/expense-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
