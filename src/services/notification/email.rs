use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{ChannelType, NotificationMessage, NotificationProvider, SendResult};
use crate::application::config::mail::MailConfig;

/// Delivers messages over SMTP.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpProvider {
    pub fn from_config(config: &MailConfig) -> Result<Self, String> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| "SMTP host is not configured".to_string())?;

        let mut builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = sender_mailbox(&config.from_name, &config.from_address)?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn sender_mailbox(name: &str, address: &str) -> Result<Mailbox, String> {
    format!("{} <{}>", name, address)
        .parse()
        .or_else(|_| address.parse())
        .map_err(|e| format!("Invalid from email address: {}", e))
}

#[async_trait]
impl NotificationProvider for SmtpProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        let to: Mailbox = match message.recipient.parse() {
            Ok(mbox) => mbox,
            Err(_) => return SendResult::failed("Invalid recipient email address"),
        };
        let to = Mailbox::new(Some(message.recipient_name.clone()), to.email);

        let email = match Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
        {
            Ok(email) => email,
            Err(e) => return SendResult::failed(format!("Failed to build email: {}", e)),
        };

        match self.transport.send(email).await {
            Ok(_) => SendResult::ok(),
            Err(e) => SendResult::failed(format!("Failed to send email: {}", e)),
        }
    }
}
