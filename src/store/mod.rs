mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    /// Case-insensitive lookup that skips deactivated users.
    fn get_active_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_users(&self, after_id: i64, limit: i32) -> Result<Vec<User>>;
    fn set_user_active(&self, id: i64, active: bool) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_tokens(&self) -> Result<Vec<Token>>;
    fn list_user_tokens(&self, user_id: i64) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // File operations
    fn create_file(&self, file: &File) -> Result<()>;
    fn get_file(&self, id: &str) -> Result<Option<File>>;
    fn list_user_files(&self, owner_id: i64) -> Result<Vec<File>>;

    // Permission catalog
    fn get_permission(&self, id: i64) -> Result<Option<Permission>>;
    fn list_permissions(&self) -> Result<Vec<Permission>>;

    // Share operations (association keyed by file, user and permission)

    /// Inserts the share or, if the (file, user, permission) triple exists,
    /// refreshes its `created_by` and `updated_at`. Atomic; `created` tells
    /// the two apart.
    fn upsert_share(
        &self,
        file_id: &str,
        user_id: i64,
        permission_id: i64,
        created_by: i64,
    ) -> Result<ShareUpsert>;
    fn get_share(&self, file_id: &str, user_id: i64, permission_id: i64)
    -> Result<Option<Share>>;
    fn list_file_shares(&self, file_id: &str) -> Result<Vec<Share>>;
    fn count_file_shares(&self, file_id: &str) -> Result<i64>;

    // Admin token check
    fn has_admin_token(&self) -> Result<bool>;
}
