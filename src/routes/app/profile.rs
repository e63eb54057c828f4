use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[allow(unused_imports)]
use crate::filters;

use crate::{
    session::SessionUser,
    state::{AppState, update_display_name},
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    email: String,
    display_name: String,
    role: String,
    member_since: String,
    subscription_status: String,
    plan_type: String,
    errors: String,
}

#[derive(Deserialize)]
pub struct ProfileFormData {
    display_name: String,
}

pub async fn profile_edit(session_user: SessionUser) -> Result<Html<String>, StatusCode> {
    let user = session_user.user();
    render(ProfileTemplate {
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        role: user.role.as_str().to_string(),
        member_since: user
            .created_at
            .as_ref()
            .map(date_to_display)
            .unwrap_or_default(),
        subscription_status: current_entitlement(&session_user).as_str().replace('_', " "),
        plan_type: user.plan_type.as_str().to_string(),
        errors: String::new(),
    })
}

pub async fn profile_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ProfileFormData>,
) -> impl IntoResponse {
    let display_name = form.display_name.trim();
    if display_name.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match update_display_name(&state, session_user.user_id(), display_name).await {
        Ok(_) => Redirect::to("/profile").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
