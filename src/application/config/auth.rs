use std::env;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for HS256 access tokens.
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_ttl_secs: i64,
    pub verification_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("SNAPSERVE_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SNAPSERVE_JWT_SECRET is not set, using an insecure development secret");
            "snapserve-development-secret-change-me".to_string()
        });

        Self {
            jwt_secret,
            jwt_issuer: env::var("SNAPSERVE_JWT_ISSUER")
                .unwrap_or_else(|_| "snapserve".to_string()),
            access_token_ttl_secs: env_parse("SNAPSERVE_JWT_TTL_SECS", 3600),
            verification_ttl_hours: env_parse("SNAPSERVE_VERIFICATION_TTL_HOURS", 24),
            bcrypt_cost: env_parse("SNAPSERVE_BCRYPT_COST", bcrypt::DEFAULT_COST).clamp(4, 31),
        }
    }
}
