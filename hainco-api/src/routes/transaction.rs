use axum::extract::State;
use axum::Json;

use hainco_core::Transaction;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.context.transaction_service.list().await?))
}
