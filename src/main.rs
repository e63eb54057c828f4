// main.rs
// Axum server wiring: initializes MongoDB state, builds the router, and
// serves on :8080.
//
// Public endpoints:
// - GET  /        -> login/signup page
// - POST /signup  -> creates a trial account, returns the otpauth URL
// - POST /login   -> validates {"email","code"} against current TOTP
//
// Everything else sits behind the session middleware.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use dotenvy::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pocketbudget::{routes, session, state};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let state = Arc::new(
        state::init_state()
            .await
            .expect("failed to initialize MongoDB state"),
    );

    let protected = Router::new()
        .route("/setup", get(routes::setup))
        .route("/qrcode", get(routes::qrcode))
        .route("/logout", post(routes::logout))
        .route("/dashboard", get(routes::dashboard))
        .route(
            "/incomes",
            get(routes::incomes_index).post(routes::incomes_create),
        )
        .route("/incomes/new", get(routes::incomes_new))
        .route("/incomes/quick-daily", post(routes::incomes_quick_daily))
        .route("/incomes/{id}/edit", get(routes::incomes_edit))
        .route("/incomes/{id}/update", post(routes::incomes_update))
        .route("/incomes/{id}/delete", post(routes::incomes_delete))
        .route("/incomes/{id}/clear-dues", post(routes::incomes_clear_dues))
        .route(
            "/expenses",
            get(routes::expenses_index).post(routes::expenses_create),
        )
        .route("/expenses/new", get(routes::expenses_new))
        .route("/expenses/{id}/edit", get(routes::expenses_edit))
        .route("/expenses/{id}/update", post(routes::expenses_update))
        .route("/expenses/{id}/delete", post(routes::expenses_delete))
        .route(
            "/income-categories",
            get(routes::income_categories_index).post(routes::income_categories_create),
        )
        .route("/income-categories/new", get(routes::income_categories_new))
        .route(
            "/income-categories/{id}/edit",
            get(routes::income_categories_edit),
        )
        .route(
            "/income-categories/{id}/update",
            post(routes::income_categories_update),
        )
        .route(
            "/income-categories/{id}/delete",
            post(routes::income_categories_delete),
        )
        .route(
            "/expense-categories",
            get(routes::expense_categories_index).post(routes::expense_categories_create),
        )
        .route(
            "/expense-categories/new",
            get(routes::expense_categories_new),
        )
        .route(
            "/expense-categories/{id}/edit",
            get(routes::expense_categories_edit),
        )
        .route(
            "/expense-categories/{id}/update",
            post(routes::expense_categories_update),
        )
        .route(
            "/expense-categories/{id}/delete",
            post(routes::expense_categories_delete),
        )
        .route(
            "/clients",
            get(routes::clients_index).post(routes::clients_create),
        )
        .route("/clients/new", get(routes::clients_new))
        .route("/clients/{id}/edit", get(routes::clients_edit))
        .route("/clients/{id}/update", post(routes::clients_update))
        .route("/clients/{id}/delete", post(routes::clients_delete))
        .route("/goals", get(routes::goals_index).post(routes::goals_create))
        .route("/goals/new", get(routes::goals_new))
        .route("/goals/{id}/edit", get(routes::goals_edit))
        .route("/goals/{id}/update", post(routes::goals_update))
        .route("/goals/{id}/delete", post(routes::goals_delete))
        .route("/subscription", get(routes::subscription_index))
        .route("/subscription/request", post(routes::subscription_request))
        .route(
            "/profile",
            get(routes::profile_edit).post(routes::profile_update),
        )
        .route("/admin/subscriptions", get(routes::pending_subscriptions_index))
        .route(
            "/admin/subscriptions/{id}/approve",
            post(routes::subscriptions_approve),
        )
        .route("/admin/users", get(routes::users_index))
        .route("/admin/users/{id}/delete", post(routes::users_delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    let app = Router::new()
        .route("/", get(routes::home))
        .route("/login", post(routes::login))
        .route("/signup", post(routes::signup))
        .merge(protected)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
