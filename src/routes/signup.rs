// routes/signup.rs
// POST /signup { "email": "...", "display_name": "..." } -> creates a
// trial account and returns the otpauth URL for authenticator enrollment.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::entitlement::TRIAL_PERIOD_DAYS;
use crate::state::{AppState, signup_user};
use crate::totp::build_totp;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub display_name: String,
}

pub async fn signup(State(st): State<Arc<AppState>>, Json(body): Json<SignupRequest>) -> Response {
    let email = body.email.trim().to_lowercase();
    let display_name = body.display_name.trim().to_string();
    if email.is_empty() || display_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "email and display_name are required" })),
        )
            .into_response();
    }

    match signup_user(&st, &email, &display_name, Utc::now()).await {
        Ok(user) => match build_totp(&user.email, &user.secret) {
            Ok(totp) => {
                tracing::info!(email = %user.email, "new trial account");
                (
                    StatusCode::CREATED,
                    Json(serde_json::json!({
                        "ok": true,
                        "email": user.email,
                        "otpauth_url": totp.get_url(),
                        "message": format!(
                            "Welcome to Pocket Budget! Your {TRIAL_PERIOD_DAYS}-day trial has started."
                        ),
                    })),
                )
                    .into_response()
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
        },
        Err(e) if e.to_string().contains("already registered") => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "email already registered" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}
