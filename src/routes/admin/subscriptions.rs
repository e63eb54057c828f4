use std::{str::FromStr, sync::Arc};

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

#[allow(unused_imports)]
use crate::filters;

use crate::{
    session::SessionUser,
    state::{AppState, approve_subscription, list_pending_subscriptions},
};

fn render<T: Template>(tpl: T) -> Result<Html<String>, StatusCode> {
    tpl.render()
        .map(Html)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub(super) fn require_admin(session_user: &SessionUser) -> Result<(), StatusCode> {
    if session_user.is_admin() {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

#[derive(Template)]
#[template(path = "admin/subscriptions/index.html")]
struct PendingSubscriptionsTemplate {
    rows: Vec<PendingRow>,
}

struct PendingRow {
    id: String,
    email: String,
    display_name: String,
    requested_plan: String,
}

pub async fn pending_subscriptions_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    require_admin(&session_user)?;

    let pending = list_pending_subscriptions(&state)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let rows = pending
        .into_iter()
        .filter_map(|user| {
            user.id.map(|id| PendingRow {
                id: id.to_hex(),
                email: user.email.clone(),
                display_name: user.display_name.clone(),
                requested_plan: user
                    .requested_plan_type
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| "n/a".to_string()),
            })
        })
        .collect();

    render(PendingSubscriptionsTemplate { rows })
}

/// Activates the requested plan for one user: period end is one calendar
/// month or year from the moment of approval.
pub async fn subscriptions_approve(
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

    match approve_subscription(&state, &object_id, Utc::now()).await {
        Ok(_) => {
            tracing::info!(user_id = %object_id, "subscription approved");
            Redirect::to("/admin/subscriptions").into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
