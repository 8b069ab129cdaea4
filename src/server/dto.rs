use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::share::ShareRequest;
use crate::types::Token;

#[derive(Debug, Default, Deserialize)]
pub struct ShareFileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permission_id: Option<i64>,
    /// Redundant with the route; must match it when present.
    #[serde(default)]
    pub file_id: Option<String>,
}

impl From<ShareFileRequest> for ShareRequest {
    fn from(req: ShareFileRequest) -> Self {
        ShareRequest {
            email: req.email,
            permission_id: req.permission_id,
            file_id: req.file_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserTokenRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    pub name: String,
    pub owner_id: i64,
    #[serde(default)]
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        TokenResponse {
            id: token.id,
            is_admin: token.is_admin,
            user_id: token.user_id,
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub metadata: TokenResponse,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub active: bool,
}
