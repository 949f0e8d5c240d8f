pub mod admin_bootstrap;
pub mod auth;
pub mod clock;
pub mod invitation;
pub mod notification;
pub mod restaurant;
pub mod scheduler;
pub mod security;
pub mod signup;
pub mod staff;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use invitation::{InvitationError, InvitationService};
pub use notification::NotificationService;
pub use security::*;

use sea_orm::{DbErr, SqlErr};

/// Canonical form used for every stored and compared email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
