use std::sync::Arc;

use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ContactListError, Result};
use crate::models::User;

type HmacSha512 = Hmac<Sha512>;

/// Claims carried by issued bearer tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject, the account email.
    pub sub: String,
    /// Token id, for traceability.
    pub jti: String,
    pub user_id: i64,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller attached to requests by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == "Admin")
    }
}

/// Issues and validates HS256 bearer tokens.
pub struct AuthService {
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn issue_token(&self, user: &User, roles: &[String]) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            user_id: user.user_id,
            roles: roles.to_vec(),
            iss: self.config.jwt.issuer.clone(),
            aud: self.config.jwt.audience.clone(),
            iat: now,
            exp: now + self.config.jwt.expiration_minutes * 60,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt.secret.as_bytes()),
        )
        .map_err(|e| ContactListError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Checks signature and expiry with zero clock-skew allowance. Issuer
    /// and audience are stamped into tokens but not enforced here.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ContactListError::Unauthorized(format!("Invalid token: {e}")))?;

        Ok(data.claims)
    }
}

/// Salted password digest. Returns hex-encoded (hash, salt); the salt is
/// the HMAC key, the password the message.
pub fn hash_password(password: &str) -> (String, String) {
    let mut salt = [0u8; 64];
    rand::thread_rng().fill(&mut salt);
    let digest = hmac_digest(&salt, password);
    (hex::encode(digest), hex::encode(salt))
}

/// Constant-time comparison against the stored digest.
pub fn verify_password(password: &str, hash_hex: &str, salt_hex: &str) -> bool {
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(&salt).expect("HMAC can take key of any size");
    mac.update(password.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn hmac_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut mac = HmacSha512::new_from_slice(salt).expect("HMAC can take key of any size");
    mac.update(password.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
