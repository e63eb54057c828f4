#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceExt; // for oneshot

use pocketbudget::{
    routes,
    session::{SESSION_COOKIE_NAME, require_session},
    state::{AppState, create_session},
};

fn build_app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(routes::dashboard))
        .route("/incomes", get(routes::incomes_index))
        .route("/subscription", get(routes::subscription_index))
        .route("/admin/users", get(routes::users_index))
        .route("/logout", post(routes::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(routes::home))
        .route("/login", post(routes::login))
        .route("/signup", post(routes::signup))
        .merge(protected)
        .with_state(state)
}

#[tokio::test]
async fn home_page_is_public() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_app(Arc::new(ctx.state.clone()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn protected_routes_reject_missing_session() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_app(Arc::new(ctx.state.clone()));

    for uri in ["/dashboard", "/incomes", "/subscription", "/admin/users"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn login_with_unknown_user_is_not_found() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_app(Arc::new(ctx.state.clone()));

    let body = serde_json::json!({ "email": "nobody@example.com", "code": "000000" });
    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn signup_then_session_cookie_grants_access() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = Arc::new(ctx.state.clone());
    let app = build_app(state.clone());

    let body = serde_json::json!({ "email": "http@example.com", "display_name": "Http Tester" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/signup")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A duplicate signup is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/signup")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The TOTP code is not predictable here, so mint the session directly.
    let token = create_session(&state, "http@example.com").await.unwrap();
    for uri in ["/dashboard", "/incomes", "/subscription"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(
                        header::COOKIE,
                        format!("{}={}", SESSION_COOKIE_NAME, token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    // A member is not an admin.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/users")
                .header(
                    header::COOKIE,
                    format!("{}={}", SESSION_COOKIE_NAME, token),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    common::teardown(Some(ctx)).await;
}
