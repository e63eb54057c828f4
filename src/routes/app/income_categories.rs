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
        AppState, count_income_categories, create_income_category, delete_income_category,
        get_income_category_by_id, list_income_categories, update_income_category,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "income_categories/index.html")]
struct IncomeCategoriesIndexTemplate {
    rows: Vec<CategoryRow>,
    can_write: bool,
    trial_limit_reached: bool,
    trial_limit: usize,
}

struct CategoryRow {
    id: String,
    name: String,
    description: String,
    has_project_tracking: bool,
    is_daily_fixed_income: bool,
    daily_fixed_amount: String,
    is_default: bool,
}

#[derive(Template)]
#[template(path = "income_categories/form.html")]
struct IncomeCategoryFormTemplate {
    action: String,
    name: String,
    description: String,
    has_project_tracking: bool,
    is_daily_fixed_income: bool,
    daily_fixed_amount: String,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct IncomeCategoryFormData {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    has_project_tracking: bool,
    #[serde(default)]
    is_daily_fixed_income: bool,
    #[serde(default)]
    daily_fixed_amount: Option<String>,
}

/// Category creation is capped during an active trial; the same limit
/// never applies to paying subscribers.
async fn trial_limit_reached(
    state: &AppState,
    session_user: &SessionUser,
) -> Result<bool, StatusCode> {
    if current_entitlement(session_user) != Entitlement::TrialActive {
        return Ok(false);
    }
    let count = count_income_categories(state, session_user.user_id())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(is_trial_limit_reached(count, TRIAL_ITEM_LIMIT))
}

pub async fn income_categories_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();
    let categories = list_income_categories(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let rows = categories
        .into_iter()
        .filter_map(|category| {
            category.id.map(|id| CategoryRow {
                id: id.to_hex(),
                name: category.name.clone(),
                description: category.description.clone().unwrap_or_default(),
                has_project_tracking: category.has_project_tracking,
                is_daily_fixed_income: category.is_daily_fixed_income,
                daily_fixed_amount: category
                    .daily_fixed_amount
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                is_default: category.is_default,
            })
        })
        .collect();

    render(IncomeCategoriesIndexTemplate {
        rows,
        can_write: current_entitlement(&session_user).can_write(),
        trial_limit_reached: trial_limit_reached(&state, &session_user).await?,
        trial_limit: TRIAL_ITEM_LIMIT,
    })
}

pub async fn income_categories_new(
    _session_user: SessionUser,
) -> Result<Html<String>, StatusCode> {
    render(IncomeCategoryFormTemplate {
        action: "/income-categories".into(),
        name: String::new(),
        description: String::new(),
        has_project_tracking: false,
        is_daily_fixed_income: false,
        daily_fixed_amount: String::new(),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn income_categories_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<IncomeCategoryFormData>,
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

    let daily_fixed_amount =
        match parse_optional_f64_field(form.daily_fixed_amount.clone(), "daily amount") {
            Ok(v) => v,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };

    match create_income_category(
        &state,
        &user_id,
        form.name.trim(),
        clean_opt(form.description),
        form.has_project_tracking,
        form.is_daily_fixed_income,
        daily_fixed_amount,
    )
    .await
    {
        Ok(_) => Redirect::to("/income-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn income_categories_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let object_id = parse_object_id(&id, "category").map_err(|_| StatusCode::BAD_REQUEST)?;
    let category = get_income_category_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&category.user_id, &session_user)?;

    render(IncomeCategoryFormTemplate {
        action: format!("/income-categories/{}/update", id),
        name: category.name.clone(),
        description: category.description.clone().unwrap_or_default(),
        has_project_tracking: category.has_project_tracking,
        is_daily_fixed_income: category.is_daily_fixed_income,
        daily_fixed_amount: category
            .daily_fixed_amount
            .map(|v| v.to_string())
            .unwrap_or_default(),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn income_categories_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<IncomeCategoryFormData>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "category") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_income_category_by_id(&state, &object_id).await {
        Ok(Some(category)) => ensure_owned(&category.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    let daily_fixed_amount =
        match parse_optional_f64_field(form.daily_fixed_amount.clone(), "daily amount") {
            Ok(v) => v,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };

    match update_income_category(
        &state,
        &object_id,
        form.name.trim(),
        clean_opt(form.description),
        form.has_project_tracking,
        form.is_daily_fixed_income,
        daily_fixed_amount,
    )
    .await
    {
        Ok(_) => Redirect::to("/income-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn income_categories_delete(
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
    if let Err(status) = match get_income_category_by_id(&state, &object_id).await {
        Ok(Some(category)) => ensure_owned(&category.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_income_category(&state, &object_id).await {
        Ok(_) => Redirect::to("/income-categories").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
