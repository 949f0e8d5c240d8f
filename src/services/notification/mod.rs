//! Outbound email notifications.
//!
//! Every `send_*` method composes a plain text message and hands it to the
//! configured [`NotificationProvider`]. Delivery is best-effort: failures are
//! logged and reported as `false`, never propagated, so a committed state
//! change is never undone by a mail outage.

mod email;
mod log;
mod templates;

pub use email::SmtpProvider;
pub use log::LogProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::config::mail::MailConfig;
use crate::models::{restaurant, staff_invitation, user, user::Role};

/// Delivery channel behind a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Log,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Log => "log",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a message is about; lets providers and tests tell messages apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StaffInvitation,
    StaffWelcome,
    RoleUpdate,
    AdminVerification,
    AdminWelcome,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StaffInvitation => "staff_invitation",
            NotificationKind::StaffWelcome => "staff_welcome",
            NotificationKind::RoleUpdate => "role_update",
            NotificationKind::AdminVerification => "admin_verification",
            NotificationKind::AdminWelcome => "admin_welcome",
        }
    }
}

/// Notification message to send
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub kind: NotificationKind,
    pub recipient: String,
    pub recipient_name: String,
    pub subject: String,
    pub body: String,
}

/// Result of sending a notification
#[derive(Debug)]
pub struct SendResult {
    pub success: bool,
    pub error: Option<String>,
}

impl SendResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Trait for notification providers
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    fn channel_type(&self) -> ChannelType;
    async fn send(&self, message: &NotificationMessage) -> SendResult;
}

/// Composes notification emails and dispatches them through one provider.
#[derive(Clone)]
pub struct NotificationService {
    provider: Arc<dyn NotificationProvider>,
}

impl NotificationService {
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self { provider }
    }

    /// SMTP when a host is configured, otherwise messages are only logged.
    pub fn from_config(config: &MailConfig) -> Self {
        if config.smtp_enabled() {
            match SmtpProvider::from_config(config) {
                Ok(provider) => {
                    tracing::info!(
                        host = config.smtp_host.as_deref().unwrap_or_default(),
                        port = config.smtp_port,
                        "Email notification provider initialized"
                    );
                    return Self::new(Arc::new(provider));
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize SMTP provider, falling back to log: {}",
                        e
                    );
                }
            }
        } else {
            tracing::info!("SMTP not configured, notifications will be logged only");
        }
        Self::new(Arc::new(LogProvider))
    }

    pub fn channel_type(&self) -> ChannelType {
        self.provider.channel_type()
    }

    async fn dispatch(&self, message: NotificationMessage) -> bool {
        let result = self.provider.send(&message).await;
        if result.success {
            tracing::info!(
                kind = message.kind.as_str(),
                recipient = %message.recipient,
                channel = %self.provider.channel_type(),
                "Notification sent"
            );
        } else {
            tracing::warn!(
                kind = message.kind.as_str(),
                recipient = %message.recipient,
                channel = %self.provider.channel_type(),
                error = result.error.as_deref().unwrap_or("unknown error"),
                "Notification delivery failed"
            );
        }
        result.success
    }

    pub async fn send_staff_invitation(
        &self,
        invitation: &staff_invitation::Model,
        restaurant: &restaurant::Model,
        invitation_url: &str,
        custom_message: Option<&str>,
    ) -> bool {
        self.dispatch(templates::staff_invitation(
            invitation,
            restaurant,
            invitation_url,
            custom_message,
        ))
        .await
    }

    pub async fn send_staff_welcome(
        &self,
        user: &user::Model,
        restaurant: &restaurant::Model,
    ) -> bool {
        self.dispatch(templates::staff_welcome(user, restaurant)).await
    }

    pub async fn send_role_update(
        &self,
        user: &user::Model,
        old_role: Role,
        new_role: Role,
        restaurant: &restaurant::Model,
    ) -> bool {
        self.dispatch(templates::role_update(user, old_role, new_role, restaurant))
            .await
    }

    pub async fn send_admin_verification(
        &self,
        user: &user::Model,
        restaurant: &restaurant::Model,
        verification_url: &str,
    ) -> bool {
        self.dispatch(templates::admin_verification(user, restaurant, verification_url))
            .await
    }

    pub async fn send_admin_welcome(
        &self,
        user: &user::Model,
        restaurant: &restaurant::Model,
    ) -> bool {
        self.dispatch(templates::admin_welcome(user, restaurant)).await
    }
}
