use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson::{self, oid::ObjectId};

use pocketbudget::dues::{
    DuesStatus, STALE_DUES_DAYS, aggregate, classify, clear_dues, due_amount, potential_loss,
};
use pocketbudget::models::{FreelanceDetails, Income};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn project_income(amount: f64, project_cost: f64, date: DateTime<Utc>) -> Income {
    Income {
        id: Some(ObjectId::new()),
        user_id: ObjectId::new(),
        description: "logo design".into(),
        amount,
        date: bson::DateTime::from_chrono(date),
        category_id: ObjectId::new(),
        client_id: None,
        freelance_details: Some(FreelanceDetails {
            client_name: "Acme".into(),
            client_number: None,
            client_address: None,
            project_cost,
            number_of_workers: None,
            dues_cleared_at: None,
        }),
        created_at: None,
        updated_at: None,
    }
}

fn plain_income(amount: f64) -> Income {
    Income {
        id: Some(ObjectId::new()),
        user_id: ObjectId::new(),
        description: "salary".into(),
        amount,
        date: bson::DateTime::from_chrono(now()),
        category_id: ObjectId::new(),
        client_id: None,
        freelance_details: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn partial_payment_is_outstanding() {
    let income = project_income(600.0, 1000.0, now());
    assert_eq!(classify(&income), Some(DuesStatus::DueOutstanding));
    assert_eq!(due_amount(&income), 400.0);

    let totals = aggregate(std::slice::from_ref(&income), None);
    assert_eq!(totals.total_paid, 600.0);
    assert_eq!(totals.total_dues, 400.0);
}

#[test]
fn full_payment_is_paid_in_full() {
    let income = project_income(1000.0, 1000.0, now());
    assert_eq!(classify(&income), Some(DuesStatus::PaidInFull));
    assert_eq!(due_amount(&income), 0.0);
}

#[test]
fn clearing_is_authoritative_over_amount_math() {
    // Cost exceeds amount, but a recorded clearing wins.
    let mut income = project_income(600.0, 1000.0, now());
    income
        .freelance_details
        .as_mut()
        .unwrap()
        .dues_cleared_at = Some(bson::DateTime::from_chrono(now()));

    assert_eq!(classify(&income), Some(DuesStatus::DueCleared));
    let totals = aggregate(std::slice::from_ref(&income), None);
    assert_eq!(totals.total_dues, 0.0);
    assert_eq!(totals.total_paid, 600.0);
}

#[test]
fn plain_income_is_excluded_from_project_aggregation() {
    let incomes = vec![plain_income(5000.0), project_income(600.0, 1000.0, now())];
    assert_eq!(classify(&incomes[0]), None);

    let totals = aggregate(&incomes, None);
    assert_eq!(totals.total_paid, 600.0);
    assert_eq!(totals.total_dues, 400.0);
}

#[test]
fn clear_dues_settles_and_stamps() {
    let income = project_income(600.0, 1000.0, now());
    let cleared = clear_dues(&income, now());

    assert_eq!(cleared.amount, 1000.0);
    let details = cleared.freelance_details.as_ref().unwrap();
    assert_eq!(
        details.dues_cleared_at,
        Some(bson::DateTime::from_chrono(now()))
    );
    assert_eq!(classify(&cleared), Some(DuesStatus::DueCleared));

    // Contribution to outstanding totals drops to zero.
    let totals = aggregate(std::slice::from_ref(&cleared), None);
    assert_eq!(totals.total_dues, 0.0);
}

#[test]
fn clear_dues_is_identity_for_non_project_income() {
    let income = plain_income(500.0);
    let cleared = clear_dues(&income, now());
    assert_eq!(cleared.amount, income.amount);
    assert!(cleared.freelance_details.is_none());
}

#[test]
fn clear_dues_is_identity_when_nothing_outstanding() {
    let income = project_income(1000.0, 1000.0, now());
    let cleared = clear_dues(&income, now());
    assert_eq!(cleared.amount, 1000.0);
    assert!(
        cleared
            .freelance_details
            .as_ref()
            .unwrap()
            .dues_cleared_at
            .is_none()
    );
}

#[test]
fn cost_edited_below_paid_amount_never_goes_negative() {
    let income = project_income(1200.0, 1000.0, now());
    assert_eq!(classify(&income), Some(DuesStatus::PaidInFull));
    assert_eq!(due_amount(&income), 0.0);

    let totals = aggregate(std::slice::from_ref(&income), None);
    assert_eq!(totals.total_dues, 0.0);
}

#[test]
fn aggregate_is_order_independent() {
    let incomes = vec![
        project_income(600.0, 1000.0, now()),
        project_income(100.0, 300.0, now()),
        plain_income(50.0),
        project_income(900.0, 900.0, now()),
    ];
    let mut reversed = incomes.clone();
    reversed.reverse();

    assert_eq!(aggregate(&incomes, None), aggregate(&reversed, None));
}

#[test]
fn aggregate_scopes_to_one_client() {
    let client_a = ObjectId::new();
    let client_b = ObjectId::new();

    let mut first = project_income(600.0, 1000.0, now());
    first.client_id = Some(client_a.clone());
    let mut second = project_income(100.0, 500.0, now());
    second.client_id = Some(client_b);

    let totals = aggregate(&[first, second], Some(&client_a));
    assert_eq!(totals.total_paid, 600.0);
    assert_eq!(totals.total_dues, 400.0);
}

#[test]
fn potential_loss_counts_only_stale_dues() {
    let fresh = project_income(600.0, 1000.0, now() - Duration::days(29));
    let stale = project_income(100.0, 600.0, now() - Duration::days(31));

    let loss = potential_loss(&[fresh, stale], now(), STALE_DUES_DAYS);
    assert_eq!(loss, 500.0);
}

#[test]
fn potential_loss_ignores_cleared_dues() {
    let stale = project_income(100.0, 500.0, now() - Duration::days(40));
    let cleared = clear_dues(&stale, now());

    assert_eq!(potential_loss(&[cleared], now(), STALE_DUES_DAYS), 0.0);
}
