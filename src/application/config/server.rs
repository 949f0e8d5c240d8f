use std::env;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from `SNAPSERVE_ALLOWED_ORIGINS` (comma-separated).
    /// When empty, any origin is allowed (dev convenience).
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let allowed_origins = env::var("SNAPSERVE_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env::var("SNAPSERVE_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("SNAPSERVE_API_PORT", 8000),
            allowed_origins,
        }
    }
}
