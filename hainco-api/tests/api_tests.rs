//! HTTP tests for the Hain.co API
//!
//! Each test builds the full router over an in-memory store and drives it
//! with `oneshot` requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use hainco_api::{app, AppState};
use hainco_core::domain::TransactionType;
use hainco_core::services::EntryPoint;
use hainco_core::{HaincoContext, LoggingService, NewTransaction};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> Arc<HaincoContext> {
    Arc::new(HaincoContext::in_memory(b"api-test-key").expect("Failed to create context"))
}

fn test_app() -> Router {
    app(AppState::new(test_context()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

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

fn staff_body(username: &str, password: Option<&str>) -> Value {
    let mut body = json!({
        "staff_full_name": "Maria Santos",
        "staff_contact_number": "09171234567",
        "staff_username": username,
        "staff_address": "Quezon City",
        "staff_position": 2
    });
    if let Some(password) = password {
        body["staff_password"] = json!(password);
    }
    body
}

fn product_body(code: &str) -> Value {
    json!({
        "product_name": "Chicken Adobo",
        "product_price": 85.5,
        "product_stock": 10,
        "product_type": "meal",
        "product_code": code
    })
}

// ============================================================================
// Root and empty tables
// ============================================================================

#[tokio::test]
async fn test_root_lists_links() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links"]["products"], "/product");
}

#[tokio::test]
async fn test_empty_lists_return_404_with_detail() {
    let app = test_app();

    for (uri, detail) in [
        ("/product", "No products exist"),
        ("/staff", "No staff records exist"),
        ("/customer", "No customer records exist"),
        ("/admin", "No admin records found"),
        ("/transaction", "No transactions found"),
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({ "detail": detail }));
    }
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_create_fetch_update() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/product/new_product", Some(product_body("MEAL-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["detail"], "Product added to database");
    assert_eq!(body["data"]["product_code"], "MEAL-1");
    assert_eq!(body["data"]["product_price"], 85.5);
    assert_eq!(body["data"]["product_is_active"], true);

    let (status, body) = send(&app, "GET", "/product/MEAL-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_id"], 1);

    let (status, body) = send(
        &app,
        "PUT",
        "/product/update_product/MEAL-1",
        Some(product_body("MEAL-2")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Product updated to database");
    assert_eq!(body["data"]["product_code"], "MEAL-2");

    let (status, body) = send(&app, "GET", "/product/MEAL-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Product does not exist.");
}

#[tokio::test]
async fn test_duplicate_product_code_is_403() {
    let app = test_app();
    send(&app, "POST", "/product/new_product", Some(product_body("MEAL-1"))).await;

    let (status, body) = send(&app, "POST", "/product/new_product", Some(product_body("MEAL-1"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Product code is already taken");
}

#[tokio::test]
async fn test_malformed_payload_is_422_with_detail() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/product/new_product",
        Some(json!({ "product_name": "Missing everything else" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_unknown_position_code_is_422() {
    let app = test_app();
    let mut body = staff_body("msantos", Some("hunter2"));
    body["staff_position"] = json!(9);

    let (status, _) = send(&app, "POST", "/staff/new_staff", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_out_of_range_price_is_422() {
    let app = test_app();
    let mut body = product_body("MEAL-1");
    body["product_price"] = json!(1_000_000_000_000u64);

    let (status, body) = send(&app, "POST", "/product/new_product", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "product price is too large");
}

#[tokio::test]
async fn test_route_segment_keys_are_rejected() {
    let app = test_app();

    let (status, body) =
        send(&app, "POST", "/product/new_product", Some(product_body("new_product"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "product code new_product is reserved");

    let (status, _) =
        send(&app, "POST", "/staff/new_staff", Some(staff_body("new_staff", Some("pw")))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Staff credentials over HTTP
// ============================================================================

#[tokio::test]
async fn test_staff_flow_exposes_only_recovered_password() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/staff/new_staff", Some(staff_body("msantos", Some("hunter2")))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["detail"], "Staff added to database");
    assert!(body["data"].get("staff_password").is_none());
    assert!(body["data"].get("staff_password_hash").is_none());

    let (status, body) = send(&app, "GET", "/staff", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body[0].get("staff_password").is_none());
    assert!(body[0].get("staff_password_salt").is_none());

    let (status, body) = send(&app, "GET", "/staff/msantos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["staff_password"], "hunter2");
    assert_eq!(body["staff_position"], 2);
    assert!(body.get("staff_password_hash").is_none());
    assert!(body.get("staff_password_salt").is_none());
}

#[tokio::test]
async fn test_staff_update_with_and_without_password() {
    let app = test_app();
    send(&app, "POST", "/staff/new_staff", Some(staff_body("msantos", Some("hunter2")))).await;

    let mut body = staff_body("msantos", None);
    body["staff_is_active"] = json!(false);
    let (status, response) = send(&app, "PUT", "/staff/update_staff/msantos", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["detail"], "Staff updated to database");
    assert_eq!(response["data"]["staff_is_active"], false);

    let (_, fetched) = send(&app, "GET", "/staff/msantos", None).await;
    assert_eq!(fetched["staff_password"], "hunter2");

    let (status, _) = send(
        &app,
        "PUT",
        "/staff/update_staff/msantos",
        Some(staff_body("msantos", Some("new-pass"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = send(&app, "GET", "/staff/msantos", None).await;
    assert_eq!(fetched["staff_password"], "new-pass");
}

#[tokio::test]
async fn test_staff_error_statuses() {
    let app = test_app();
    send(&app, "POST", "/staff/new_staff", Some(staff_body("msantos", Some("a")))).await;

    let (status, body) = send(&app, "POST", "/staff/new_staff", Some(staff_body("msantos", Some("b")))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Username is already taken");

    let (status, body) = send(&app, "GET", "/staff/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Username does not exist.");

    let (status, body) = send(&app, "PUT", "/staff/update_staff/nobody", Some(staff_body("nobody", None))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Staff does not exist.");

    let (status, _) = send(&app, "POST", "/staff/new_staff", Some(staff_body("jdoe", Some("naïve")))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Customers and admins
// ============================================================================

#[tokio::test]
async fn test_customer_flow() {
    let app = test_app();
    let body = json!({
        "customer_first_name": "Juan",
        "customer_last_name": "Dela Cruz",
        "customer_email": "juan@example.com",
        "customer_contact_number": "09998887777",
        "customer_password": "pa55word"
    });

    let (status, response) = send(&app, "POST", "/customer/new_customer", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["detail"], "Customer added to database");
    assert_eq!(response["data"]["customer_middle_name"], Value::Null);

    let (status, response) = send(&app, "POST", "/customer/new_customer", Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["detail"], "Email is already taken");

    let (status, response) = send(&app, "GET", "/customer/juan@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["customer_password"], "pa55word");

    let (status, response) = send(&app, "GET", "/customer/nobody@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["detail"], "Account does not exist.");
}

#[tokio::test]
async fn test_admin_flow() {
    let app = test_app();
    let body = json!({
        "admin_full_name": "Clarence Reyes",
        "admin_username": "root",
        "admin_password": "t0p-secret"
    });

    let (status, response) = send(&app, "POST", "/admin/new_admin", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["data"]["admin_position"], 1);

    let (status, response) = send(&app, "GET", "/admin/root", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["admin_password"], "t0p-secret");

    let update = json!({
        "admin_full_name": "Clarence Reyes",
        "admin_username": "root",
        "admin_position": 2
    });
    let (status, response) = send(&app, "PUT", "/admin/update_admin/root", Some(update.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["detail"], "Admin updated to database");
    assert_eq!(response["data"]["admin_position"], 2);

    let (status, response) = send(&app, "PUT", "/admin/update_admin/ghost", Some(update)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["detail"], "Admin does not exist.");
}

// ============================================================================
// Ledger, row counts and event log
// ============================================================================

#[tokio::test]
async fn test_transactions_and_row_count() {
    let context = test_context();
    context
        .transaction_service
        .record(NewTransaction {
            transaction_agent: "msantos".to_string(),
            transaction_description: Some("Walk-in".to_string()),
            transaction_type: TransactionType::Buy,
            transaction_amount: Decimal::new(17100, 2),
            transaction_date: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        })
        .await
        .unwrap();
    let app = app(AppState::new(Arc::clone(&context)));

    let (status, body) = send(&app, "GET", "/transaction", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["transaction_type"], 2);
    assert_eq!(body[0]["transaction_amount"], 171.0);
    assert_eq!(body[0]["transaction_date"], "2024-06-01T12:00:00");

    let (status, body) = send(&app, "GET", "/meta/row_count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            ["hainco_product", 0],
            ["hainco_staff", 0],
            ["hainco_customer", 0],
            ["hainco_admin", 0],
            ["hainco_transaction", 1]
        ])
    );
}

#[tokio::test]
async fn test_writes_are_recorded_without_user_data() {
    let events = Arc::new(LoggingService::open_in_memory(EntryPoint::Api, "test").unwrap());
    let app = app(AppState::new(test_context()).with_events(Arc::clone(&events)));

    send(&app, "POST", "/staff/new_staff", Some(staff_body("msantos", Some("hunter2")))).await;

    let entries = events.get_recent(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event, "record_created");
    assert_eq!(entries[0].resource.as_deref(), Some("staff"));

    let dump = serde_json::to_string(&entries).unwrap();
    assert!(!dump.contains("msantos"));
    assert!(!dump.contains("hunter2"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/product")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}
