mod files;
mod permissions;
pub mod shares;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Files owned by the caller
        .route("/files", get(files::list_files))
        .route("/files/{file}", get(files::get_file))
        .route("/files/{file}/shares", get(shares::list_file_shares))
        // Permission catalog
        .route("/permissions", get(permissions::list_permissions))
}
