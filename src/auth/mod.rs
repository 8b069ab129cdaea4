mod helpers;
mod middleware;
mod token;

pub use middleware::{AuthError, RequireAdmin, RequireUser};
pub use token::{IssuedToken, TokenGenerator, parse_token};
