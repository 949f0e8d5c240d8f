use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::user;

/// Bytes of entropy behind invitation and verification tokens.
pub const TOKEN_BYTES: usize = 32;

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, CONFIG.auth.bcrypt_cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Hashed at the configured cost so an unknown email costs as much as a wrong password.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("snapserve-unknown-account").unwrap_or_default());

/// Spend one bcrypt verification on a login that has no account behind it.
pub fn verify_dummy_password(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

fn signing_key() -> EncodingKey {
    EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes())
}

/// Issue an HS256 access token for `user`.
pub fn create_access_token(user: &user::Model) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(CONFIG.auth.access_token_ttl_secs);

    let claims = Claims {
        sub: user.id.to_string(),
        iss: CONFIG.auth.jwt_issuer.clone(),
        email: Some(user.email.clone()),
        role: Some(user.role.as_str().to_string()),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &signing_key()).map_err(|e| e.into())
}

/// Decode and validate a JWT token
pub fn decode_token(token: &str) -> Result<Claims> {
    let decoding_key = DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[CONFIG.auth.jwt_issuer.as_str()]);
    // No clock skew tolerance for expiration check
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

/// Generate a cryptographically secure random string (hex)
pub fn generate_random_string(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Opaque single-use token for invitations and email verification.
pub fn generate_token() -> String {
    generate_random_string(TOKEN_BYTES)
}
