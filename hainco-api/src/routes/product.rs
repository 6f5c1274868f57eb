use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use hainco_core::domain::{Product, ProductInput};

use super::{added, updated, Envelope};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.context.product_service.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.context.product_service.get(&product_code).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<ProductInput>,
) -> Result<(StatusCode, Json<Envelope<Product>>), ApiError> {
    let product = state.context.product_service.create(input).await?;
    state.record("record_created", "product");
    Ok(added(product, "Product"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(current_product_code): Path<String>,
    Payload(input): Payload<ProductInput>,
) -> Result<Json<Envelope<Product>>, ApiError> {
    let product = state
        .context
        .product_service
        .update(&current_product_code, input)
        .await?;
    state.record("record_updated", "product");
    Ok(updated(product, "Product"))
}
