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
        AppState, count_goals, create_goal, delete_goal, get_goal_by_id, list_goals, update_goal,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "goals/index.html")]
struct GoalsIndexTemplate {
    rows: Vec<GoalRow>,
    can_write: bool,
    trial_limit_reached: bool,
    trial_limit: usize,
}

struct GoalRow {
    id: String,
    name: String,
    description: String,
    target_amount: f64,
    current_amount: f64,
    progress_pct: i64,
}

#[derive(Template)]
#[template(path = "goals/form.html")]
struct GoalFormTemplate {
    action: String,
    name: String,
    description: String,
    target_amount: String,
    current_amount: String,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct GoalFormData {
    name: String,
    target_amount: String,
    #[serde(default)]
    current_amount: Option<String>,
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
    let count = count_goals(state, session_user.user_id())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(is_trial_limit_reached(count, TRIAL_ITEM_LIMIT))
}

pub async fn goals_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();
    let goals = list_goals(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let rows = goals
        .into_iter()
        .filter_map(|goal| {
            goal.id.map(|id| {
                let progress = if goal.target_amount > 0.0 {
                    ((goal.current_amount / goal.target_amount) * 100.0).clamp(0.0, 100.0)
                } else {
                    0.0
                };
                GoalRow {
                    id: id.to_hex(),
                    name: goal.name.clone(),
                    description: goal.description.clone().unwrap_or_default(),
                    target_amount: goal.target_amount,
                    current_amount: goal.current_amount,
                    progress_pct: progress.round() as i64,
                }
            })
        })
        .collect();

    render(GoalsIndexTemplate {
        rows,
        can_write: current_entitlement(&session_user).can_write(),
        trial_limit_reached: trial_limit_reached(&state, &session_user).await?,
        trial_limit: TRIAL_ITEM_LIMIT,
    })
}

pub async fn goals_new(_session_user: SessionUser) -> Result<Html<String>, StatusCode> {
    render(GoalFormTemplate {
        action: "/goals".into(),
        name: String::new(),
        description: String::new(),
        target_amount: "0".into(),
        current_amount: "0".into(),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn goals_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<GoalFormData>,
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

    let target_amount = match parse_f64_field(&form.target_amount, "target amount") {
        Ok(v) => v,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let current_amount = match parse_optional_f64_field(form.current_amount.clone(), "saved amount")
    {
        Ok(v) => v.unwrap_or(0.0),
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match create_goal(
        &state,
        &user_id,
        form.name.trim(),
        target_amount,
        current_amount,
        clean_opt(form.description),
    )
    .await
    {
        Ok(_) => Redirect::to("/goals").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn goals_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let object_id = parse_object_id(&id, "goal").map_err(|_| StatusCode::BAD_REQUEST)?;
    let goal = get_goal_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&goal.user_id, &session_user)?;

    render(GoalFormTemplate {
        action: format!("/goals/{}/update", id),
        name: goal.name.clone(),
        description: goal.description.clone().unwrap_or_default(),
        target_amount: goal.target_amount.to_string(),
        current_amount: goal.current_amount.to_string(),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn goals_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<GoalFormData>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "goal") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_goal_by_id(&state, &object_id).await {
        Ok(Some(goal)) => ensure_owned(&goal.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    let target_amount = match parse_f64_field(&form.target_amount, "target amount") {
        Ok(v) => v,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let current_amount = match parse_optional_f64_field(form.current_amount.clone(), "saved amount")
    {
        Ok(v) => v.unwrap_or(0.0),
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match update_goal(
        &state,
        &object_id,
        form.name.trim(),
        target_amount,
        current_amount,
        clean_opt(form.description),
    )
    .await
    {
        Ok(_) => Redirect::to("/goals").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn goals_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "goal") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_goal_by_id(&state, &object_id).await {
        Ok(Some(goal)) => ensure_owned(&goal.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_goal(&state, &object_id).await {
        Ok(_) => Redirect::to("/goals").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
