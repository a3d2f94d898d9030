use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();

    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"))
    )
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth("alice", "password"));

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_account(app: &Router, name: &str, opening_balance: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/accounts",
        Some(json!({
            "name": name,
            "kind": "checking",
            "opening_balance": opening_balance,
            "currency": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn post_entry(app: &Router, route: &str, account_id: &str, amount: &str, category: Option<&str>) {
    let (status, _) = send(
        app,
        "POST",
        route,
        Some(json!({
            "account_id": account_id,
            "amount": amount,
            "category": category,
            "note": null,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let app = app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/accounts")
        .header(header::AUTHORIZATION, basic_auth("alice", "nope"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accounts_round_trip() {
    let app = app().await;

    create_account(&app, "Operating", "45000.00").await;

    let (status, body) = send(&app, "GET", "/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["name"], "Operating");
    assert_eq!(accounts[0]["balance"], "45000.00");
    assert_eq!(accounts[0]["currency"], "USD");
    assert_eq!(accounts[0]["active"], true);
}

#[tokio::test]
async fn duplicate_account_names_conflict() {
    let app = app().await;
    create_account(&app, "Operating", "0.00").await;

    let (status, _) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({
            "name": "Operating",
            "kind": "savings",
            "opening_balance": "0.00",
            "currency": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_amounts_are_unprocessable() {
    let app = app().await;
    let account_id = create_account(&app, "Operating", "100.00").await;

    let (status, body) = send(
        &app,
        "POST",
        "/expense",
        Some(json!({
            "account_id": account_id,
            "amount": "not-a-number",
            "category": null,
            "note": null,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Invalid amount"));
}

#[tokio::test]
async fn unknown_accounts_are_not_found() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/income",
        Some(json!({
            "account_id": "7f3e8a30-9f5e-4be2-b2a2-111111111111",
            "amount": "10.00",
            "category": null,
            "note": null,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_reports_burn_and_runway() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "50000.00").await;
    create_account(&app, "Savings", "125000.00").await;

    post_entry(&app, "/expense", &operating, "3500.00", Some("Payroll")).await;
    post_entry(&app, "/expense", &operating, "2500.00", Some("Hosting")).await;
    post_entry(&app, "/income", &operating, "1000.00", Some("Revenue")).await;

    let (status, body) = send(&app, "GET", "/summary", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["total_balance"], json!(170000.0));
    assert_eq!(body["monthly_expenses"], json!(6000.0));
    assert_eq!(body["monthly_revenue"], json!(1000.0));
    assert_eq!(body["monthly_burn"], json!(5000.0));
    assert_eq!(body["runway_months"], json!(34.0));
}

#[tokio::test]
async fn summary_without_burn_reports_sentinel() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "45000.00").await;
    create_account(&app, "Savings", "125000.00").await;

    post_entry(&app, "/expense", &operating, "2847.00", Some("Engineering")).await;
    post_entry(&app, "/income", &operating, "45000.00", Some("Revenue")).await;

    let (status, body) = send(&app, "GET", "/summary", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["monthly_burn"], json!(-42153.0));
    assert_eq!(body["runway_months"], json!(999.0));
}

#[tokio::test]
async fn breakdown_weights_categories() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "10000.00").await;

    post_entry(&app, "/expense", &operating, "1500.00", Some("Engineering")).await;
    post_entry(&app, "/expense", &operating, "1500.00", Some("Engineering")).await;
    post_entry(&app, "/expense", &operating, "1000.00", None).await;

    let (status, body) = send(&app, "GET", "/expenses/breakdown", None).await;
    assert_eq!(status, StatusCode::OK);

    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    let engineering = categories
        .iter()
        .find(|c| c["category"] == "Engineering")
        .unwrap();
    assert_eq!(engineering["amount"], json!(3000.0));
    assert_eq!(engineering["percentage"], json!(75.0));
    let uncategorized = categories
        .iter()
        .find(|c| c["category"] == "Uncategorized")
        .unwrap();
    assert_eq!(uncategorized["amount"], json!(1000.0));
    assert_eq!(uncategorized["percentage"], json!(25.0));
}

#[tokio::test]
async fn budgets_round_trip_with_report() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "10000.00").await;

    let (status, _) = send(
        &app,
        "POST",
        "/budgets",
        Some(json!({"category": "Payroll", "monthly_limit": "3000.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    post_entry(&app, "/expense", &operating, "3500.00", Some("Payroll")).await;

    let (status, body) = send(&app, "GET", "/budgets/report", None).await;
    assert_eq!(status, StatusCode::OK);
    let budgets = body["budgets"].as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["spent"], "3500.00");
    assert_eq!(budgets[0]["remaining"], "-500.00");
    assert_eq!(budgets[0]["over_limit"], true);
}

#[tokio::test]
async fn transactions_list_pages_with_cursor() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "1000.00").await;

    for _ in 0..3 {
        post_entry(&app, "/expense", &operating, "10.00", Some("Fees")).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/transactions",
        Some(json!({"limit": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 2);
    let cursor = body["next_cursor"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "GET",
        "/transactions",
        Some(json!({"limit": 2, "cursor": cursor})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
    assert!(body["next_cursor"].is_null());
}

#[tokio::test]
async fn projection_reports_cash_out() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "25000.00").await;

    post_entry(&app, "/expense", &operating, "6000.00", Some("Payroll")).await;
    post_entry(&app, "/income", &operating, "1000.00", Some("Revenue")).await;

    let (status, body) = send(
        &app,
        "POST",
        "/runway/projection",
        Some(json!({"months": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["months"].as_array().unwrap().len(), 6);
    assert_eq!(body["months"][0]["ending_balance"], json!(15000.0));
    assert_eq!(body["cash_out_month"], json!(5));
}

#[tokio::test]
async fn sync_restores_the_replayed_balance() {
    let app = app().await;
    let operating = create_account(&app, "Operating", "1000.00").await;

    post_entry(&app, "/expense", &operating, "200.00", None).await;

    let (status, body) = send(&app, "POST", &format!("/accounts/{operating}/sync"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "800.00");
    assert!(body["last_synced_at"].is_string());
}
