use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use crate::auth::{RequireAdmin, TokenGenerator};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateTokenResponse, CreateUserRequest, CreateUserTokenRequest, PaginationParams,
    TokenResponse, UpdateUserRequest,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, StoreOptionExt, StoreResultExt, paginate,
};
use crate::server::validation::{validate_email, validate_user_name};
use crate::types::NewUser;

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let name = req.name.trim();
    let email = req.email.trim();
    validate_user_name(name).map_err(ApiError::bad_request)?;
    validate_email(email).map_err(ApiError::bad_request)?;

    let user = match state.store.create_user(&NewUser {
        name: name.to_string(),
        email: email.to_string(),
    }) {
        Ok(user) => user,
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("A user with that email already exists"));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create user");
            return Err(ApiError::internal("Failed to create user"));
        }
    };

    tracing::info!(user_id = user.id, "Created user");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created.", user)),
    ))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let users = state
        .store
        .list_users(params.cursor.unwrap_or(0), DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list users")?;

    let page = paginate(users, DEFAULT_PAGE_SIZE as usize, |u| u.id);

    Ok::<_, ApiError>(Json(ApiResponse::success("Users retrieved.", page)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("User retrieved.", user)))
}

/// Deactivated users keep their data but can no longer authenticate or
/// receive new shares.
pub async fn update_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    state
        .store
        .set_user_active(id, req.active)
        .api_err("Failed to update user")?;

    let user = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success("User updated.", user)))
}

pub async fn list_user_tokens(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let tokens: Vec<TokenResponse> = state
        .store
        .list_user_tokens(user.id)
        .api_err("Failed to list user tokens")?
        .into_iter()
        .map(TokenResponse::from)
        .collect();

    Ok::<_, ApiError>(Json(ApiResponse::success("Tokens retrieved.", tokens)))
}

pub async fn create_user_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<CreateUserTokenRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let user = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if !user.active {
        return Err(ApiError::bad_request("Cannot create a token for an inactive user"));
    }

    let expires_at = match req.expires_in_seconds {
        Some(seconds) if seconds <= 0 => {
            return Err(ApiError::bad_request(
                "expires_in_seconds must be a positive number",
            ));
        }
        Some(seconds) => Some(
            Duration::try_seconds(seconds)
                .and_then(|d| Utc::now().checked_add_signed(d))
                .ok_or_else(|| ApiError::bad_request("expires_in_seconds is too large"))?,
        ),
        None => None,
    };

    let issued = TokenGenerator::new()
        .issue(Some(user.id), expires_at)
        .api_err("Failed to generate token")?;

    state
        .store
        .create_token(&issued.token)
        .api_err("Failed to create token")?;

    tracing::info!(user_id = user.id, token_id = %issued.token.id, "Created user token");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Token created.",
            CreateTokenResponse {
                token: issued.raw,
                metadata: issued.token.into(),
            },
        )),
    ))
}
