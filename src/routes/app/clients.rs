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
    session::SessionUser,
    state::{
        AppState, client_financial_summaries, create_client, delete_client, get_client_by_id,
        update_client,
    },
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "clients/index.html")]
struct ClientsIndexTemplate {
    rows: Vec<ClientRow>,
    can_write: bool,
}

struct ClientRow {
    id: String,
    name: String,
    number: String,
    address: String,
    total_paid: f64,
    total_dues: f64,
    has_dues: bool,
}

#[derive(Template)]
#[template(path = "clients/form.html")]
struct ClientFormTemplate {
    action: String,
    name: String,
    number: String,
    address: String,
    is_edit: bool,
    errors: String,
}

#[derive(Deserialize)]
pub struct ClientFormData {
    name: String,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

pub async fn clients_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let user_id = session_user.user_id().clone();
    let summaries = client_financial_summaries(&state, &user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let rows = summaries
        .into_iter()
        .filter_map(|summary| {
            summary.client.id.map(|id| ClientRow {
                id: id.to_hex(),
                name: summary.client.name.clone(),
                number: summary.client.number.clone().unwrap_or_default(),
                address: summary.client.address.clone().unwrap_or_default(),
                total_paid: summary.totals.total_paid,
                total_dues: summary.totals.total_dues,
                has_dues: summary.totals.total_dues > 0.0,
            })
        })
        .collect();

    render(ClientsIndexTemplate {
        rows,
        can_write: current_entitlement(&session_user).can_write(),
    })
}

pub async fn clients_new(_session_user: SessionUser) -> Result<Html<String>, StatusCode> {
    render(ClientFormTemplate {
        action: "/clients".into(),
        name: String::new(),
        number: String::new(),
        address: String::new(),
        is_edit: false,
        errors: String::new(),
    })
}

pub async fn clients_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ClientFormData>,
) -> impl IntoResponse {
    let user_id = session_user.user_id().clone();
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }
    if form.name.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match create_client(
        &state,
        &user_id,
        form.name.trim(),
        clean_opt(form.number),
        clean_opt(form.address),
    )
    .await
    {
        Ok(_) => Redirect::to("/clients").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn clients_edit(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let object_id = parse_object_id(&id, "client").map_err(|_| StatusCode::BAD_REQUEST)?;
    let client = get_client_by_id(&state, &object_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    ensure_owned(&client.user_id, &session_user)?;

    render(ClientFormTemplate {
        action: format!("/clients/{}/update", id),
        name: client.name.clone(),
        number: client.number.clone().unwrap_or_default(),
        address: client.address.clone().unwrap_or_default(),
        is_edit: true,
        errors: String::new(),
    })
}

pub async fn clients_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ClientFormData>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "client") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_client_by_id(&state, &object_id).await {
        Ok(Some(client)) => ensure_owned(&client.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match update_client(
        &state,
        &object_id,
        form.name.trim(),
        clean_opt(form.number),
        clean_opt(form.address),
    )
    .await
    {
        Ok(_) => Redirect::to("/clients").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn clients_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(status) = require_write_access(&session_user) {
        return status.into_response();
    }

    let object_id = match parse_object_id(&id, "client") {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if let Err(status) = match get_client_by_id(&state, &object_id).await {
        Ok(Some(client)) => ensure_owned(&client.user_id, &session_user),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    } {
        return status.into_response();
    }

    match delete_client(&state, &object_id).await {
        Ok(_) => Redirect::to("/clients").into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
