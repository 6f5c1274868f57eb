use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use hainco_core::domain::{Admin, AdminUpdate, AdminWithPassword, NewAdmin};

use super::{added, updated, Envelope};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Admin>>, ApiError> {
    Ok(Json(state.context.admin_service.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AdminWithPassword>, ApiError> {
    Ok(Json(state.context.admin_service.get(&username).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(payload): Payload<NewAdmin>,
) -> Result<(StatusCode, Json<Envelope<Admin>>), ApiError> {
    let admin = state.context.admin_service.create(payload).await?;
    state.record("record_created", "admin");
    Ok(added(admin, "Admin"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(current_username): Path<String>,
    Payload(payload): Payload<AdminUpdate>,
) -> Result<Json<Envelope<Admin>>, ApiError> {
    let admin = state
        .context
        .admin_service
        .update(&current_username, payload)
        .await?;
    state.record("record_updated", "admin");
    Ok(updated(admin, "Admin"))
}
