use anyhow::{Context, Result, bail};
use chrono::{DateTime as ChronoDateTime, Utc};
use data_encoding::BASE32_NOPAD;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use rand::RngCore;
use std::time::{Duration, SystemTime};

use crate::entitlement;
use crate::models::{Session, SubscriptionStatus, User, UserRole};
use crate::totp::generate_base32_secret;

use super::{AppState, SESSION_TTL_SECONDS, seed};

pub async fn find_user(state: &AppState, email: &str) -> Result<Option<User>> {
    state
        .users
        .find_one(doc! { "email": email })
        .await
        .map_err(Into::into)
}

pub async fn get_user_by_id(state: &AppState, id: &ObjectId) -> Result<Option<User>> {
    state
        .users
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>> {
    let mut cursor = state.users.find(doc! {}).await?;
    let mut users = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        users.push(user);
    }
    Ok(users)
}

/// Register a new account: fresh TOTP secret, member role, and a trial
/// profile ending [`entitlement::TRIAL_PERIOD_DAYS`] from `now`. Also
/// seeds the default category set for the new user.
pub async fn signup_user(
    state: &AppState,
    email: &str,
    display_name: &str,
    now: ChronoDateTime<Utc>,
) -> Result<User> {
    if find_user(state, email).await?.is_some() {
        bail!("email already registered");
    }

    let secret = generate_base32_secret();
    let trial_end = DateTime::from_chrono(entitlement::trial_end(now));

    let res = state
        .users
        .insert_one(User {
            id: None,
            email: email.to_string(),
            display_name: display_name.to_string(),
            secret,
            role: UserRole::Member,
            created_at: Some(DateTime::from_chrono(now)),
            subscription_status: SubscriptionStatus::Trial,
            plan_type: Default::default(),
            requested_plan_type: None,
            trial_end_date: Some(trial_end),
            subscription_end_date: None,
            subscribed_at: None,
        })
        .await?;
    let user_id = res
        .inserted_id
        .as_object_id()
        .context("user insert missing _id")?;

    seed::seed_categories_for_user(&state.income_categories, &state.expense_categories, &user_id)
        .await?;

    get_user_by_id(state, &user_id)
        .await?
        .context("user vanished right after signup")
}

/// Remove a user and everything they own. Admin-only; irreversible.
pub async fn delete_user(state: &AppState, id: &ObjectId) -> Result<()> {
    let user = state
        .users
        .find_one(doc! { "_id": id })
        .await?
        .context("user not found")?;

    state.users.delete_one(doc! { "_id": id }).await?;
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": &user.email })
        .await;
    for result in [
        state.incomes.delete_many(doc! { "user_id": id }).await,
        state.expenses.delete_many(doc! { "user_id": id }).await,
        state
            .income_categories
            .delete_many(doc! { "user_id": id })
            .await,
        state
            .expense_categories
            .delete_many(doc! { "user_id": id })
            .await,
        state.clients.delete_many(doc! { "user_id": id }).await,
        state.goals.delete_many(doc! { "user_id": id }).await,
    ] {
        result?;
    }
    Ok(())
}

pub async fn update_display_name(
    state: &AppState,
    id: &ObjectId,
    display_name: &str,
) -> Result<()> {
    state
        .users
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "display_name": display_name,
            } },
        )
        .await?;
    Ok(())
}

pub async fn create_session(state: &AppState, email: &str) -> Result<String> {
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": email.to_string() })
        .await;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = BASE32_NOPAD.encode(&token_bytes);

    let expires_at =
        DateTime::from_system_time(SystemTime::now() + Duration::from_secs(SESSION_TTL_SECONDS));

    state
        .sessions
        .insert_one(Session {
            id: None,
            token: token.clone(),
            user_email: email.to_string(),
            expires_at,
        })
        .await?;

    Ok(token)
}

pub async fn find_user_by_session(state: &AppState, token: &str) -> Result<Option<User>> {
    if let Some(session) = state.sessions.find_one(doc! { "token": token }).await? {
        let expires_at = session.expires_at.to_system_time();
        if expires_at <= SystemTime::now() {
            // Remove expired session, ignore result
            let _ = state.sessions.delete_one(doc! { "token": token }).await;
            return Ok(None);
        }
        find_user(state, &session.user_email).await
    } else {
        Ok(None)
    }
}

pub async fn delete_session(state: &AppState, token: &str) -> Result<()> {
    let _ = state.sessions.delete_one(doc! { "token": token }).await?;
    Ok(())
}
