use std::{str::FromStr, sync::Arc};

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};

#[allow(unused_imports)]
use crate::filters;

use crate::{
    session::SessionUser,
    state::{AppState, delete_user, list_users},
};
use mongodb::bson::oid::ObjectId;

use super::subscriptions::require_admin;

fn render<T: Template>(tpl: T) -> Result<Html<String>, StatusCode> {
    tpl.render()
        .map(Html)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Template)]
#[template(path = "admin/users/index.html")]
struct UsersIndexTemplate {
    users: Vec<UserRow>,
}

struct UserRow {
    id: String,
    email: String,
    display_name: String,
    role: String,
    subscription_status: String,
    plan_type: String,
    is_self: bool,
}

pub async fn users_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    require_admin(&session_user)?;

    let users = list_users(&state)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let self_id = session_user.user_id().clone();

    let rows = users
        .into_iter()
        .filter_map(|user| {
            user.id.map(|id| UserRow {
                id: id.to_hex(),
                email: user.email.clone(),
                display_name: user.display_name.clone(),
                role: user.role.as_str().to_string(),
                subscription_status: user.subscription_status.as_str().to_string(),
                plan_type: user.plan_type.as_str().to_string(),
                is_self: id == self_id,
            })
        })
        .collect();

    render(UsersIndexTemplate { users: rows })
}

/// Removes the user document and everything it owns. Admins cannot
/// delete their own account from here.
pub async fn users_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_admin(&session_user) {
        return status.into_response();
    }

    let object_id = match ObjectId::from_str(&id) {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if &object_id == session_user.user_id() {
        return StatusCode::FORBIDDEN.into_response();
    }

    match delete_user(&state, &object_id).await {
        Ok(_) => {
            tracing::info!(user_id = %object_id, "user deleted");
            Redirect::to("/admin/users").into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
