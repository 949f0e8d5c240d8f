use async_trait::async_trait;

use super::{ChannelType, NotificationMessage, NotificationProvider, SendResult};

/// Writes messages to the log instead of sending them. Used when SMTP is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProvider;

#[async_trait]
impl NotificationProvider for LogProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Log
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        tracing::info!(
            kind = message.kind.as_str(),
            to = %message.recipient,
            subject = %message.subject,
            "Email (not sent, SMTP disabled):\n{}",
            message.body
        );
        SendResult::ok()
    }
}
