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
    entitlement::Entitlement,
    models::PlanType,
    session::SessionUser,
    state::{AppState, request_subscription},
};

use super::helpers::*;

#[derive(Template)]
#[template(path = "subscription/index.html")]
struct SubscriptionTemplate {
    status_text: String,
    plans: Vec<PlanCard>,
}

struct PlanCard {
    value: String,
    name: String,
    price: String,
    duration: String,
    button_label: String,
    disabled: bool,
}

#[derive(Deserialize)]
pub struct SubscriptionRequestFormData {
    plan: String,
}

pub async fn subscription_index(session_user: SessionUser) -> Result<Html<String>, StatusCode> {
    let user = session_user.user();
    let verdict = current_entitlement(&session_user);

    let requested = user.requested_plan_type;
    let status_text = match verdict {
        Entitlement::Pending => format!(
            "Your {} plan request is pending admin approval.",
            requested.unwrap_or_default().as_str()
        ),
        Entitlement::TrialActive => match user.trial_end_date.as_ref() {
            Some(end) => format!("Trial active until {}.", date_to_display(end)),
            None => "Trial active.".to_string(),
        },
        Entitlement::TrialExpired => match user.trial_end_date.as_ref() {
            Some(end) => format!(
                "Your trial ended on {}. Choose a plan to continue.",
                date_to_display(end)
            ),
            None => "Your trial has ended. Choose a plan to continue.".to_string(),
        },
        Entitlement::Active => match user.subscription_end_date.as_ref() {
            Some(end) => format!(
                "Active {} plan. Renews on {}.",
                user.plan_type.as_str(),
                date_to_display(end)
            ),
            None => format!("Active {} plan.", user.plan_type.as_str()),
        },
        Entitlement::SubscriptionExpired => match user.subscription_end_date.as_ref() {
            Some(end) => format!(
                "Your {} subscription expired on {}. Please renew.",
                user.plan_type.as_str(),
                date_to_display(end)
            ),
            None => "Your subscription has expired. Please renew.".to_string(),
        },
        Entitlement::None => "No active subscription. Choose a plan below.".to_string(),
    };

    let is_active = verdict == Entitlement::Active;
    let plans = [
        (PlanType::Monthly, "Monthly Plan", "₹199", "per month"),
        (PlanType::Yearly, "Yearly Plan", "₹1999", "per year"),
    ]
    .into_iter()
    .map(|(plan, name, price, duration)| {
        let currently_active = is_active && user.plan_type == plan;
        let request_pending = verdict == Entitlement::Pending && requested == Some(plan);
        let button_label = if currently_active {
            "Currently Active"
        } else if request_pending {
            "Request Pending"
        } else {
            "Request Plan"
        };
        PlanCard {
            value: plan.as_str().to_string(),
            name: name.to_string(),
            price: price.to_string(),
            duration: duration.to_string(),
            button_label: button_label.to_string(),
            disabled: is_active || request_pending,
        }
    })
    .collect();

    render(SubscriptionTemplate { status_text, plans })
}

pub async fn subscription_request(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubscriptionRequestFormData>,
) -> impl IntoResponse {
    let plan = match parse_plan_type(&form.plan) {
        Ok(plan) => plan,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    // A still-running subscription cannot be replaced by a new request.
    if current_entitlement(&session_user) == Entitlement::Active {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match request_subscription(&state, session_user.user_id(), plan).await {
        Ok(_) => {
            tracing::info!(user = %session_user.user().email, plan = plan.as_str(), "plan requested");
            Redirect::to("/subscription").into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
