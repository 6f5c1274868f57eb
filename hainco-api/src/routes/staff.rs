use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use hainco_core::domain::{NewStaff, Staff, StaffUpdate, StaffWithPassword};

use super::{added, updated, Envelope};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Staff>>, ApiError> {
    Ok(Json(state.context.staff_service.list().await?))
}

/// Includes the recovered `staff_password`
pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<StaffWithPassword>, ApiError> {
    Ok(Json(state.context.staff_service.get(&username).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(payload): Payload<NewStaff>,
) -> Result<(StatusCode, Json<Envelope<Staff>>), ApiError> {
    let staff = state.context.staff_service.create(payload).await?;
    state.record("record_created", "staff");
    Ok(added(staff, "Staff"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(current_username): Path<String>,
    Payload(payload): Payload<StaffUpdate>,
) -> Result<Json<Envelope<Staff>>, ApiError> {
    let staff = state
        .context
        .staff_service
        .update(&current_username, payload)
        .await?;
    state.record("record_updated", "staff");
    Ok(updated(staff, "Staff"))
}
