use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use hainco_core::domain::{Customer, CustomerUpdate, CustomerWithPassword, NewCustomer};

use super::{added, updated, Envelope};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.context.customer_service.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CustomerWithPassword>, ApiError> {
    Ok(Json(state.context.customer_service.get(&email).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(payload): Payload<NewCustomer>,
) -> Result<(StatusCode, Json<Envelope<Customer>>), ApiError> {
    let customer = state.context.customer_service.create(payload).await?;
    state.record("record_created", "customer");
    Ok(added(customer, "Customer"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(current_email): Path<String>,
    Payload(payload): Payload<CustomerUpdate>,
) -> Result<Json<Envelope<Customer>>, ApiError> {
    let customer = state
        .context
        .customer_service
        .update(&current_email, payload)
        .await?;
    state.record("record_updated", "customer");
    Ok(updated(customer, "Customer"))
}
