use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn list_permissions(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let permissions = state
        .store
        .list_permissions()
        .api_err("Failed to list permissions")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Permissions retrieved.",
        permissions,
    )))
}
