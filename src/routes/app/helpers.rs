use std::{collections::HashMap, str::FromStr};

use askama::Template;
use axum::{http::StatusCode, response::Html};
use chrono::Utc;
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::entitlement::{self, Entitlement};
use crate::models::{Client, ExpenseCategory, IncomeCategory, PlanType};
use crate::session::SessionUser;

pub(super) fn render<T: Template>(tpl: T) -> Result<Html<String>, StatusCode> {
    tpl.render()
        .map(Html)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Entitlement of the current session's profile snapshot at the wall
/// clock. Evaluated per request; nothing is cached.
pub(super) fn current_entitlement(session_user: &SessionUser) -> Entitlement {
    entitlement::evaluate(session_user.user(), Utc::now())
}

/// Gate for every mutating budgeting route. Pending requests and lapsed
/// periods fail closed.
pub(super) fn require_write_access(session_user: &SessionUser) -> Result<(), StatusCode> {
    if current_entitlement(session_user).can_write() {
        Ok(())
    } else {
        Err(StatusCode::PAYMENT_REQUIRED)
    }
}

pub(super) fn ensure_owned(
    entity_user: &ObjectId,
    session_user: &SessionUser,
) -> Result<(), StatusCode> {
    if entity_user != session_user.user_id() {
        Err(StatusCode::FORBIDDEN)
    } else {
        Ok(())
    }
}

#[derive(Clone)]
pub(super) struct SimpleOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub(super) fn clean_opt(input: Option<String>) -> Option<String> {
    input.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(super) fn parse_object_id(value: &str, label: &str) -> Result<ObjectId, String> {
    ObjectId::from_str(value).map_err(|_| format!("invalid {}", label))
}

pub(super) fn parse_optional_object_id(
    value: Option<String>,
    label: &str,
) -> Result<Option<ObjectId>, String> {
    match clean_opt(value) {
        Some(v) => Ok(Some(parse_object_id(&v, label)?)),
        None => Ok(None),
    }
}

pub(super) fn parse_f64_field(value: &str, label: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{} must be numeric", label))
}

pub(super) fn parse_optional_f64_field(
    value: Option<String>,
    label: &str,
) -> Result<Option<f64>, String> {
    match clean_opt(value) {
        Some(v) => Ok(Some(parse_f64_field(&v, label)?)),
        None => Ok(None),
    }
}

pub(super) fn parse_i32_field(value: &str, label: &str) -> Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("{} must be numeric", label))
}

pub(super) fn parse_optional_i32_field(
    value: Option<String>,
    label: &str,
) -> Result<Option<i32>, String> {
    match clean_opt(value) {
        Some(v) => Ok(Some(parse_i32_field(&v, label)?)),
        None => Ok(None),
    }
}

pub(super) fn parse_datetime_field(value: &str, label: &str) -> Result<DateTime, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!(
            "{} is required (use RFC3339: 2024-01-01T00:00:00Z)",
            label
        ));
    }
    DateTime::parse_rfc3339_str(trimmed).map_err(|_| format!("invalid date/time for {}", label))
}

pub(super) fn parse_plan_type(value: &str) -> Result<PlanType, String> {
    match value.to_lowercase().as_str() {
        "monthly" => Ok(PlanType::Monthly),
        "yearly" => Ok(PlanType::Yearly),
        _ => Err("invalid plan type".into()),
    }
}

pub(super) fn datetime_to_string(dt: &DateTime) -> String {
    dt.try_to_rfc3339_string()
        .unwrap_or_else(|_| dt.to_string())
}

pub(super) fn date_to_display(dt: &DateTime) -> String {
    dt.to_chrono().date_naive().to_string()
}

pub(super) fn income_category_options(
    categories: &[IncomeCategory],
    selected: Option<&ObjectId>,
) -> Vec<SimpleOption> {
    categories
        .iter()
        .filter_map(|category| {
            category.id.as_ref().map(|id| SimpleOption {
                value: id.to_hex(),
                label: category.name.clone(),
                selected: selected.map(|s| s == id).unwrap_or(false),
            })
        })
        .collect()
}

pub(super) fn expense_category_options(
    categories: &[ExpenseCategory],
    selected: Option<&ObjectId>,
) -> Vec<SimpleOption> {
    categories
        .iter()
        .filter_map(|category| {
            category.id.as_ref().map(|id| SimpleOption {
                value: id.to_hex(),
                label: category.name.clone(),
                selected: selected.map(|s| s == id).unwrap_or(false),
            })
        })
        .collect()
}

pub(super) fn client_options(
    clients: &[Client],
    selected: Option<&ObjectId>,
) -> Vec<SimpleOption> {
    clients
        .iter()
        .filter_map(|client| {
            client.id.as_ref().map(|id| SimpleOption {
                value: id.to_hex(),
                label: client.name.clone(),
                selected: selected.map(|s| s == id).unwrap_or(false),
            })
        })
        .collect()
}

pub(super) fn build_lookup_map(items: Vec<(ObjectId, String)>) -> HashMap<ObjectId, String> {
    let mut map = HashMap::new();
    for (id, name) in items {
        map.insert(id, name);
    }
    map
}
