use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::ShareFileRequest;
use crate::server::response::{
    ApiError, ApiResponse, FILE_NOT_FOUND, SHARE_FAILED, SHARE_SUCCESS, StoreOptionExt,
    StoreResultExt,
};
use crate::share::{ShareError, ShareRequest, authorize_share};

/// `POST /share-file/{file}`
///
/// Checks run in a fixed order: route file exists, caller owns it, body
/// parses, then the service validates and writes.
pub async fn share_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    payload: Result<Json<ShareFileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let file = state
        .store
        .get_file(&file_id)
        .api_err("Failed to share file.")?
        .or_not_found(FILE_NOT_FOUND)?;

    authorize_share(auth.user.id, &file)?;

    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(file_id = %file.id, "Rejected share body: {}", rejection.body_text());
        ApiError::unprocessable(format!(
            "{SHARE_FAILED}: the request body must be a JSON object."
        ))
    })?;

    let req: ShareRequest = req.into();
    state.shares.share_file(&auth.user, &file, &req)?;

    Ok::<_, ApiError>(Json(ApiResponse::message(SHARE_SUCCESS)))
}

/// `GET /api/v1/files/{file}/shares`
pub async fn list_file_shares(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    let file = state
        .store
        .get_file(&file_id)
        .api_err("Failed to get file")?
        .or_not_found(FILE_NOT_FOUND)?;

    let shares = state
        .shares
        .list_file_shares(&auth.user, &file)
        .map_err(|e| match e {
            ShareError::Forbidden => {
                ApiError::forbidden("You do not have permission to view shares of this file.")
            }
            other => other.into(),
        })?;

    Ok::<_, ApiError>(Json(ApiResponse::success("Shares retrieved.", shares)))
}
