use anyhow::{Context, Result, bail};
use chrono::{DateTime as ChronoDateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, DateTime, doc, oid::ObjectId};

use crate::entitlement;
use crate::models::{PlanType, SubscriptionStatus, User};

use super::AppState;

/// Place a plan request: the user goes to `pending_confirmation` and any
/// previous grant is wiped. Activation happens only through
/// [`approve_subscription`].
pub async fn request_subscription(
    state: &AppState,
    user_id: &ObjectId,
    plan: PlanType,
) -> Result<()> {
    if plan == PlanType::None {
        bail!("a concrete plan must be requested");
    }

    state
        .users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": {
                "subscription_status": SubscriptionStatus::PendingConfirmation.as_str(),
                "requested_plan_type": plan.as_str(),
                "plan_type": PlanType::None.as_str(),
                "subscribed_at": Bson::Null,
                "subscription_end_date": Bson::Null,
            } },
        )
        .await?;
    Ok(())
}

/// Admin approval of a pending request: activates the requested plan with
/// a period end of one calendar month or year from `now`.
pub async fn approve_subscription(
    state: &AppState,
    user_id: &ObjectId,
    now: ChronoDateTime<Utc>,
) -> Result<()> {
    let user = state
        .users
        .find_one(doc! { "_id": user_id })
        .await?
        .context("user not found")?;

    let plan = user
        .requested_plan_type
        .context("user has no pending plan request")?;
    let end = entitlement::subscription_period_end(plan, now)
        .context("requested plan has no subscription period")?;

    state
        .users
        .update_one(
            doc! { "_id": user_id },
            doc! {
                "$set": {
                    "subscription_status": SubscriptionStatus::Active.as_str(),
                    "plan_type": plan.as_str(),
                    "subscribed_at": DateTime::from_chrono(now),
                    "subscription_end_date": DateTime::from_chrono(end),
                },
                "$unset": { "requested_plan_type": "" },
            },
        )
        .await?;
    Ok(())
}

pub async fn list_pending_subscriptions(state: &AppState) -> Result<Vec<User>> {
    let mut cursor = state
        .users
        .find(doc! { "subscription_status": SubscriptionStatus::PendingConfirmation.as_str() })
        .await?;
    let mut users = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        users.push(user);
    }
    Ok(users)
}
