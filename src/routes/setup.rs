// routes/setup.rs
// GET /setup -> returns the otpauth:// URL of the logged-in account.

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::session::SessionUser;
use crate::totp::build_totp;

/// Returns { email, otpauth_url } so the account can be (re-)enrolled in
/// authenticator apps.
pub async fn setup(session: SessionUser) -> impl IntoResponse {
    let user = session.user();
    match build_totp(&user.email, &user.secret) {
        Ok(totp) => {
            let url = totp.get_url(); // v5: no args, already contains issuer/account
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "email": user.email,
                    "otpauth_url": url
                })),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
