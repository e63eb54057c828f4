use std::time::SystemTime;

use chrono::Utc;
use mongodb::bson::DateTime;

use pocketbudget::dues::DuesStatus;
use pocketbudget::models::FreelanceDetails;
use pocketbudget::state::{
    clear_income_dues, client_financial_summaries, count_goals, create_client, create_expense,
    create_goal, create_income, create_income_category, delete_client, delete_expense,
    delete_goal, delete_income, delete_income_category, get_client_by_id, get_expense_by_id,
    get_goal_by_id, get_income_by_id, list_expense_categories, list_income_categories,
    quick_daily_income, signup_user,
};

#[path = "common/mod.rs"]
mod common;

fn now() -> DateTime {
    DateTime::from_system_time(SystemTime::now())
}

#[tokio::test]
async fn signup_seeds_default_categories() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "crud@example.com", "Crud Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let income_categories = list_income_categories(&state, &user_id).await.unwrap();
    assert!(income_categories.iter().all(|c| c.is_default));
    assert!(
        income_categories
            .iter()
            .any(|c| c.has_project_tracking && c.name.contains("Freelance"))
    );

    let expense_categories = list_expense_categories(&state, &user_id).await.unwrap();
    assert!(expense_categories.len() >= 5);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn incomes_crud_works() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "incomes@example.com", "Income Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let categories = list_income_categories(&state, &user_id).await.unwrap();
    let salary = categories
        .iter()
        .find(|c| !c.has_project_tracking)
        .unwrap()
        .id
        .clone()
        .unwrap();

    let income_id = create_income(
        &state,
        &user_id,
        "June salary",
        50000.0,
        now(),
        &salary,
        None,
        None,
    )
    .await
    .unwrap();

    let fetched = get_income_by_id(&state, &income_id).await.unwrap().unwrap();
    assert_eq!(fetched.description, "June salary");
    assert!(fetched.freelance_details.is_none());

    delete_income(&state, &income_id).await.unwrap();
    assert!(get_income_by_id(&state, &income_id).await.unwrap().is_none());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn project_income_requires_tracking_category() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "tracking@example.com", "Track Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let categories = list_income_categories(&state, &user_id).await.unwrap();
    let plain = categories
        .iter()
        .find(|c| !c.has_project_tracking)
        .unwrap()
        .id
        .clone()
        .unwrap();

    let details = FreelanceDetails {
        client_name: "Acme".into(),
        client_number: None,
        client_address: None,
        project_cost: 1000.0,
        number_of_workers: None,
        dues_cleared_at: None,
    };
    let result = create_income(
        &state,
        &user_id,
        "logo design",
        600.0,
        now(),
        &plain,
        None,
        Some(details),
    )
    .await;
    assert!(result.is_err());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn client_summaries_and_clearing_work() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "clients@example.com", "Client Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let categories = list_income_categories(&state, &user_id).await.unwrap();
    let freelance = categories
        .iter()
        .find(|c| c.has_project_tracking)
        .unwrap()
        .id
        .clone()
        .unwrap();

    let client_id = create_client(
        &state,
        &user_id,
        "Acme Corp",
        Some("555-0100".into()),
        None,
    )
    .await
    .unwrap();

    let income_id = create_income(
        &state,
        &user_id,
        "website build",
        600.0,
        now(),
        &freelance,
        Some(client_id.clone()),
        Some(FreelanceDetails {
            client_name: "Acme Corp".into(),
            client_number: None,
            client_address: None,
            project_cost: 1000.0,
            number_of_workers: Some(2),
            dues_cleared_at: None,
        }),
    )
    .await
    .unwrap();

    let summaries = client_financial_summaries(&state, &user_id).await.unwrap();
    let acme = summaries
        .iter()
        .find(|s| s.client.id.as_ref() == Some(&client_id))
        .unwrap();
    assert_eq!(acme.totals.total_paid, 600.0);
    assert_eq!(acme.totals.total_dues, 400.0);

    // Clearing settles the remainder and zeroes the outstanding total.
    let cleared = clear_income_dues(&state, &income_id, Utc::now())
        .await
        .unwrap();
    assert_eq!(cleared.amount, 1000.0);
    assert_eq!(pocketbudget::dues::classify(&cleared), Some(DuesStatus::DueCleared));

    let persisted = get_income_by_id(&state, &income_id).await.unwrap().unwrap();
    assert_eq!(persisted.amount, 1000.0);
    assert!(
        persisted
            .freelance_details
            .as_ref()
            .unwrap()
            .dues_cleared_at
            .is_some()
    );

    let summaries = client_financial_summaries(&state, &user_id).await.unwrap();
    let acme = summaries
        .iter()
        .find(|s| s.client.id.as_ref() == Some(&client_id))
        .unwrap();
    assert_eq!(acme.totals.total_paid, 1000.0);
    assert_eq!(acme.totals.total_dues, 0.0);

    // Clearing twice is a no-op.
    let again = clear_income_dues(&state, &income_id, Utc::now())
        .await
        .unwrap();
    assert_eq!(again.amount, 1000.0);

    delete_client(&state, &client_id).await.unwrap();
    assert!(get_client_by_id(&state, &client_id).await.unwrap().is_none());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn quick_daily_income_uses_category_amount() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "daily@example.com", "Daily Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let category_id = create_income_category(
        &state,
        &user_id,
        "Shop counter",
        None,
        false,
        true,
        Some(750.0),
    )
    .await
    .unwrap();

    let income_id = quick_daily_income(&state, &user_id, &category_id, Utc::now())
        .await
        .unwrap();
    let income = get_income_by_id(&state, &income_id).await.unwrap().unwrap();
    assert_eq!(income.amount, 750.0);
    assert!(income.description.contains("Shop counter"));

    // A referenced category cannot be deleted.
    assert!(delete_income_category(&state, &category_id).await.is_err());
    delete_income(&state, &income_id).await.unwrap();
    delete_income_category(&state, &category_id).await.unwrap();

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn expenses_and_goals_crud_work() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let state = ctx.state.clone();

    let user = signup_user(&state, "misc@example.com", "Misc Tester", Utc::now())
        .await
        .unwrap();
    let user_id = user.id.clone().unwrap();

    let expense_categories = list_expense_categories(&state, &user_id).await.unwrap();
    let category = expense_categories[0].id.clone().unwrap();

    let expense_id = create_expense(&state, &user_id, "groceries", 1200.0, now(), &category)
        .await
        .unwrap();
    let fetched = get_expense_by_id(&state, &expense_id).await.unwrap().unwrap();
    assert_eq!(fetched.amount, 1200.0);
    delete_expense(&state, &expense_id).await.unwrap();

    assert_eq!(count_goals(&state, &user_id).await.unwrap(), 0);
    let goal_id = create_goal(
        &state,
        &user_id,
        "Emergency fund",
        100000.0,
        2500.0,
        Some("Six months of expenses".into()),
    )
    .await
    .unwrap();
    assert_eq!(count_goals(&state, &user_id).await.unwrap(), 1);

    let goal = get_goal_by_id(&state, &goal_id).await.unwrap().unwrap();
    assert_eq!(goal.current_amount, 2500.0);

    delete_goal(&state, &goal_id).await.unwrap();
    assert!(get_goal_by_id(&state, &goal_id).await.unwrap().is_none());

    common::teardown(Some(ctx)).await;
}
