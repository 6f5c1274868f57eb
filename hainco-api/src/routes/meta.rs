use axum::extract::State;
use axum::Json;

use hainco_core::TableRowCount;

use crate::error::ApiError;
use crate::state::AppState;

/// `[[table_name, row_count], ...]`
pub async fn row_count(State(state): State<AppState>) -> Result<Json<Vec<TableRowCount>>, ApiError> {
    Ok(Json(state.context.meta_service.row_counts().await?))
}
