use chrono::{TimeZone, Utc};
use mongodb::bson::DateTime;

use pocketbudget::entitlement::{Entitlement, evaluate, subscription_period_end};
use pocketbudget::models::{PlanType, SubscriptionStatus};
use pocketbudget::state::{
    approve_subscription, delete_user, find_user, get_user_by_id, list_goals,
    list_income_categories, list_pending_subscriptions, request_subscription, signup_user,
};

#[path = "common/mod.rs"]
mod common;

#[tokio::test]
async fn seeded_admin_user_exists() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let admin = find_user(&state, "admin@pocketbudget.local").await.unwrap();
    if let Some(admin) = admin {
        assert!(admin.role.is_admin());
        // Administration needs no budgeting entitlement.
        assert_eq!(admin.subscription_status, SubscriptionStatus::None);
    }

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn trial_to_active_lifecycle() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let signup_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let user = signup_user(&state, "lifecycle@example.com", "Lifecycle", signup_at)
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    // Fresh signup: 15-day trial with write access.
    assert_eq!(user.subscription_status, SubscriptionStatus::Trial);
    let verdict = evaluate(&user, signup_at);
    assert_eq!(verdict, Entitlement::TrialActive);
    assert!(verdict.can_write());

    // Once the trial window passes, the same snapshot reads as expired.
    let after_trial = Utc.with_ymd_and_hms(2024, 6, 20, 9, 0, 0).unwrap();
    assert_eq!(evaluate(&user, after_trial), Entitlement::TrialExpired);

    // Requesting a plan parks the profile in pending confirmation.
    request_subscription(&state, &user_id, PlanType::Monthly)
        .await
        .unwrap();
    let pending = get_user_by_id(&state, &user_id).await.unwrap().unwrap();
    assert_eq!(
        pending.subscription_status,
        SubscriptionStatus::PendingConfirmation
    );
    assert_eq!(pending.requested_plan_type, Some(PlanType::Monthly));
    assert_eq!(pending.plan_type, PlanType::None);

    let verdict = evaluate(&pending, signup_at);
    assert_eq!(verdict, Entitlement::Pending);
    assert!(!verdict.can_write());

    let queue = list_pending_subscriptions(&state).await.unwrap();
    assert!(queue.iter().any(|u| u.id == Some(user_id.clone())));

    // Admin approval activates the plan for one calendar month.
    let approved_at = Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap();
    approve_subscription(&state, &user_id, approved_at)
        .await
        .unwrap();

    let active = get_user_by_id(&state, &user_id).await.unwrap().unwrap();
    assert_eq!(active.subscription_status, SubscriptionStatus::Active);
    assert_eq!(active.plan_type, PlanType::Monthly);
    assert_eq!(active.requested_plan_type, None);
    assert_eq!(
        active.subscribed_at,
        Some(DateTime::from_chrono(approved_at))
    );
    assert_eq!(
        active.subscription_end_date,
        Some(DateTime::from_chrono(
            subscription_period_end(PlanType::Monthly, approved_at).unwrap()
        ))
    );

    let verdict = evaluate(&active, approved_at);
    assert_eq!(verdict, Entitlement::Active);
    assert!(verdict.can_write());

    // A second approval without a new request fails.
    assert!(approve_subscription(&state, &user_id, approved_at).await.is_err());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn deleting_a_user_cascades_owned_documents() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "cascade@example.com", "Cascade", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();
    assert!(
        !list_income_categories(&state, &user_id)
            .await
            .unwrap()
            .is_empty()
    );

    delete_user(&state, &user_id).await.unwrap();
    assert!(get_user_by_id(&state, &user_id).await.unwrap().is_none());
    assert!(
        list_income_categories(&state, &user_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(list_goals(&state, &user_id).await.unwrap().is_empty());

    common::teardown(Some(ctx)).await;
}
