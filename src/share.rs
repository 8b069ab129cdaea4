//! File sharing: who may share a file, and the upsert that records it.

use std::sync::Arc;

use thiserror::Error;

use crate::error::Error as StoreError;
use crate::server::validation::validate_email;
use crate::store::Store;
use crate::types::{File, Share, User};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("requester does not own the file")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] StoreError),
}

/// Body of a share request. Every field is optional so that shape errors
/// surface as `ShareError::Validation` instead of a deserializer rejection.
#[derive(Debug, Default, Clone)]
pub struct ShareRequest {
    pub email: Option<String>,
    pub permission_id: Option<i64>,
    pub file_id: Option<String>,
}

/// Only the file's owner may share it or inspect its shares.
pub fn authorize_share(requester_id: i64, file: &File) -> Result<(), ShareError> {
    if file.created_by == requester_id {
        Ok(())
    } else {
        Err(ShareError::Forbidden)
    }
}

pub struct ShareService {
    store: Arc<dyn Store>,
}

impl ShareService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Grants the user behind `req.email` the permission `req.permission_id`
    /// on `file`. Re-sharing the same triple refreshes the existing row.
    pub fn share_file(
        &self,
        requester: &User,
        file: &File,
        req: &ShareRequest,
    ) -> Result<Share, ShareError> {
        authorize_share(requester.id, file)?;

        let (email, permission_id) = validate_request(file, req)?;

        if self.store.get_permission(permission_id)?.is_none() {
            return Err(ShareError::Validation(
                "the selected permission id is invalid.".to_string(),
            ));
        }

        let recipient = self
            .store
            .get_active_user_by_email(email)?
            .ok_or_else(|| ShareError::NotFound("no user found with that email.".to_string()))?;

        let upsert = self
            .store
            .upsert_share(&file.id, recipient.id, permission_id, requester.id)?;

        tracing::info!(
            file_id = %file.id,
            user_id = recipient.id,
            permission_id,
            created_by = requester.id,
            "{}",
            if upsert.created { "Share created" } else { "Share updated" }
        );

        Ok(upsert.share)
    }

    pub fn list_file_shares(&self, requester: &User, file: &File) -> Result<Vec<Share>, ShareError> {
        authorize_share(requester.id, file)?;
        Ok(self.store.list_file_shares(&file.id)?)
    }
}

fn validate_request<'a>(file: &File, req: &'a ShareRequest) -> Result<(&'a str, i64), ShareError> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ShareError::Validation("the email field is required.".to_string()))?;
    validate_email(email).map_err(ShareError::Validation)?;

    let permission_id = req.permission_id.ok_or_else(|| {
        ShareError::Validation("the permission id field is required.".to_string())
    })?;
    if permission_id <= 0 {
        return Err(ShareError::Validation(
            "the permission id must be a positive integer.".to_string(),
        ));
    }

    if let Some(body_file_id) = &req.file_id {
        if body_file_id != &file.id {
            return Err(ShareError::Validation(
                "the file id does not match the requested file.".to_string(),
            ));
        }
    }

    Ok((email, permission_id))
}
