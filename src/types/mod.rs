mod models;
mod permission;

pub use models::{File, NewUser, Share, ShareUpsert, Token, User};
pub use permission::Permission;
