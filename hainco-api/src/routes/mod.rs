//! Route table

mod admin;
mod customer;
mod meta;
mod product;
mod staff;
mod transaction;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Write response: the stored record plus a confirmation message
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub detail: String,
}

pub(crate) fn added<T>(data: T, resource: &str) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::CREATED,
        Json(Envelope {
            data,
            detail: format!("{} added to database", resource),
        }),
    )
}

pub(crate) fn updated<T>(data: T, resource: &str) -> Json<Envelope<T>> {
    Json(Envelope {
        data,
        detail: format!("{} updated to database", resource),
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        // Products
        .route("/product", get(product::list))
        .route("/product/new_product", post(product::create))
        .route("/product/update_product/{current_product_code}", put(product::update))
        .route("/product/{product_code}", get(product::get))
        // Staff
        .route("/staff", get(staff::list))
        .route("/staff/new_staff", post(staff::create))
        .route("/staff/update_staff/{current_username}", put(staff::update))
        .route("/staff/{username}", get(staff::get))
        // Customers
        .route("/customer", get(customer::list))
        .route("/customer/new_customer", post(customer::create))
        .route("/customer/update_customer/{current_email}", put(customer::update))
        .route("/customer/{email}", get(customer::get))
        // Admins
        .route("/admin", get(admin::list))
        .route("/admin/new_admin", post(admin::create))
        .route("/admin/update_admin/{current_username}", put(admin::update))
        .route("/admin/{username}", get(admin::get))
        // Ledger and diagnostics
        .route("/transaction", get(transaction::list))
        .route("/meta/row_count", get(meta::row_count))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Hain.co canteen API. The links below list each resource.",
        "links": {
            "products": "/product",
            "staff": "/staff",
            "customers": "/customer",
            "admins": "/admin",
            "transactions": "/transaction",
            "row_count": "/meta/row_count"
        }
    }))
}
