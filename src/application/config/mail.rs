use std::env;

use super::{env_flag, env_parse};

/// SMTP settings. Email is delivered through the log provider when no host is set.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub from_address: String,
    pub from_name: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: non_empty("SNAPSERVE_SMTP_HOST"),
            smtp_port: env_parse("SNAPSERVE_SMTP_PORT", 587),
            smtp_username: non_empty("SNAPSERVE_SMTP_USERNAME"),
            smtp_password: non_empty("SNAPSERVE_SMTP_PASSWORD"),
            smtp_tls: env_flag("SNAPSERVE_SMTP_TLS", true),
            from_address: env::var("SNAPSERVE_MAIL_FROM")
                .unwrap_or_else(|_| "noreply@snapserve.local".to_string()),
            from_name: env::var("SNAPSERVE_MAIL_FROM_NAME")
                .unwrap_or_else(|_| "SnapServe".to_string()),
        }
    }

    pub fn smtp_enabled(&self) -> bool {
        self.smtp_host.is_some()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
