pub mod auth;
pub mod permissions;

pub use auth::require_auth;
pub use auth::{AuthenticatedUser, MaybeAuthenticatedUser};
pub use permissions::*;
