use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson;

use pocketbudget::entitlement::{
    Entitlement, TRIAL_ITEM_LIMIT, TRIAL_PERIOD_DAYS, evaluate, is_trial_limit_reached,
    subscription_period_end, trial_end,
};
use pocketbudget::models::{PlanType, SubscriptionStatus, User, UserRole};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn profile(status: SubscriptionStatus) -> User {
    User {
        id: None,
        email: "user@example.com".into(),
        display_name: "Test User".into(),
        secret: String::new(),
        role: UserRole::Member,
        created_at: None,
        subscription_status: status,
        plan_type: PlanType::None,
        requested_plan_type: None,
        trial_end_date: None,
        subscription_end_date: None,
        subscribed_at: None,
    }
}

fn ts(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(dt)
}

#[test]
fn active_with_future_end_grants_write() {
    let mut user = profile(SubscriptionStatus::Active);
    user.plan_type = PlanType::Monthly;
    user.subscription_end_date = Some(ts(now() + Duration::days(10)));

    let verdict = evaluate(&user, now());
    assert_eq!(verdict, Entitlement::Active);
    assert!(verdict.can_write());
}

#[test]
fn active_with_past_end_is_expired() {
    let mut user = profile(SubscriptionStatus::Active);
    user.subscription_end_date = Some(ts(now() - Duration::seconds(1)));

    let verdict = evaluate(&user, now());
    assert_eq!(verdict, Entitlement::SubscriptionExpired);
    assert!(!verdict.can_write());
}

#[test]
fn active_without_end_date_fails_closed() {
    let user = profile(SubscriptionStatus::Active);
    assert_eq!(evaluate(&user, now()), Entitlement::SubscriptionExpired);
}

#[test]
fn trial_with_future_end_grants_write() {
    let mut user = profile(SubscriptionStatus::Trial);
    user.trial_end_date = Some(ts(now() + Duration::days(3)));

    let verdict = evaluate(&user, now());
    assert_eq!(verdict, Entitlement::TrialActive);
    assert!(verdict.can_write());
}

#[test]
fn trial_end_exactly_now_is_expired() {
    // The boundary is exclusive: an end date equal to `now` no longer
    // grants access.
    let mut user = profile(SubscriptionStatus::Trial);
    user.trial_end_date = Some(ts(now()));

    let verdict = evaluate(&user, now());
    assert_eq!(verdict, Entitlement::TrialExpired);
    assert!(!verdict.can_write());
}

#[test]
fn trial_without_end_date_fails_closed() {
    let user = profile(SubscriptionStatus::Trial);
    assert_eq!(evaluate(&user, now()), Entitlement::TrialExpired);
}

#[test]
fn pending_request_does_not_grant_write() {
    let mut user = profile(SubscriptionStatus::PendingConfirmation);
    user.requested_plan_type = Some(PlanType::Yearly);
    // Even an unexpired trial date does not help once the status moved to
    // pending.
    user.trial_end_date = Some(ts(now() + Duration::days(5)));

    let verdict = evaluate(&user, now());
    assert_eq!(verdict, Entitlement::Pending);
    assert!(!verdict.can_write());
}

#[test]
fn pending_without_request_is_none() {
    let user = profile(SubscriptionStatus::PendingConfirmation);
    assert_eq!(evaluate(&user, now()), Entitlement::None);
}

#[test]
fn cancelled_and_none_yield_none() {
    assert_eq!(
        evaluate(&profile(SubscriptionStatus::Cancelled), now()),
        Entitlement::None
    );
    assert_eq!(
        evaluate(&profile(SubscriptionStatus::None), now()),
        Entitlement::None
    );
}

#[test]
fn stored_expired_status_maps_to_subscription_expired() {
    assert_eq!(
        evaluate(&profile(SubscriptionStatus::Expired), now()),
        Entitlement::SubscriptionExpired
    );
}

#[test]
fn trial_limit_boundaries() {
    assert!(is_trial_limit_reached(TRIAL_ITEM_LIMIT, TRIAL_ITEM_LIMIT));
    assert!(is_trial_limit_reached(TRIAL_ITEM_LIMIT + 1, TRIAL_ITEM_LIMIT));
    assert!(!is_trial_limit_reached(TRIAL_ITEM_LIMIT - 1, TRIAL_ITEM_LIMIT));
}

#[test]
fn trial_end_is_fifteen_days_out() {
    let end = trial_end(now());
    assert_eq!(end - now(), Duration::days(TRIAL_PERIOD_DAYS as i64));
}

#[test]
fn subscription_periods_use_calendar_arithmetic() {
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

    let monthly = subscription_period_end(PlanType::Monthly, start).unwrap();
    // chrono clamps to the end of February.
    assert_eq!(monthly, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());

    let yearly = subscription_period_end(PlanType::Yearly, start).unwrap();
    assert_eq!(yearly, Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());

    assert!(subscription_period_end(PlanType::None, start).is_none());
}
