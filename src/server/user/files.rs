use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{
    ApiError, ApiResponse, FILE_NOT_FOUND, StoreOptionExt, StoreResultExt,
};

pub async fn list_files(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let files = state
        .store
        .list_user_files(auth.user.id)
        .api_err("Failed to list files")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Files retrieved.", files)))
}

/// Owners and anyone the file is shared with may read its metadata.
pub async fn get_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    let file = state
        .store
        .get_file(&file_id)
        .api_err("Failed to get file")?
        .or_not_found(FILE_NOT_FOUND)?;

    if file.created_by != auth.user.id {
        let shared = state
            .store
            .list_file_shares(&file.id)
            .api_err("Failed to check file access")?
            .iter()
            .any(|s| s.user_id == auth.user.id);

        // Hide existence from users with no access.
        if !shared {
            return Err(ApiError::not_found(FILE_NOT_FOUND));
        }
    }

    Ok(Json(ApiResponse::success("File retrieved.", file)))
}
