use std::sync::Arc;

use crate::services::clock::{SharedClock, SystemClock};
use crate::services::notification::NotificationService;

pub use crate::application::database::DbConn;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub notification: NotificationService,
    pub clock: SharedClock,
}

impl AppState {
    pub fn new(db: DbConn, notification: NotificationService) -> Self {
        Self::with_clock(db, notification, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DbConn, notification: NotificationService, clock: SharedClock) -> Self {
        Self {
            db,
            notification,
            clock,
        }
    }
}
