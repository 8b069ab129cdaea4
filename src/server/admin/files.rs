use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::CreateFileRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_file_name;
use crate::types::File;

/// Registers file metadata on behalf of `owner_id`. No bytes are stored.
pub async fn create_file(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateFileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let name = req.name.trim();
    validate_file_name(name).map_err(ApiError::bad_request)?;

    let size_bytes = req.size_bytes.unwrap_or(0);
    if size_bytes < 0 {
        return Err(ApiError::bad_request("size_bytes cannot be negative"));
    }

    let owner = state
        .store
        .get_user(req.owner_id)
        .api_err("Failed to get user")?
        .or_not_found("Owner not found")?;

    let now = Utc::now();
    let file = File {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_by: owner.id,
        size_bytes,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_file(&file)
        .api_err("Failed to create file")?;

    tracing::info!(file_id = %file.id, owner_id = owner.id, "Registered file");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("File created.", file)),
    ))
}
