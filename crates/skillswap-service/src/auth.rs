//! Bearer tokens and password hashing
//!
//! Tokens are HS256 JWTs whose subject is the account email. Validating a
//! token yields an [`Identity`], which every service call receives
//! explicitly.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skillswap_core::{AccountRole, Person};

use crate::error::{Result, ServiceError};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: AccountRole,
}

impl Identity {
    pub fn new(email: impl Into<String>, role: AccountRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }

    /// Fail with `Authorization` unless the caller is an admin
    pub fn require_admin(&self) -> Result<()> {
        if !self.is_admin() {
            return Err(ServiceError::forbidden("administrator role required"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: AccountRole,
    exp: i64,
    iat: i64,
}

/// Signed bearer token returned by login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, person: &Person) -> Result<IssuedToken> {
        self.issue_at(person, Utc::now())
    }

    fn issue_at(&self, person: &Person, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: person.email.clone(),
            role: person.account_role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ServiceError::Internal(format!("failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_at,
        })
    }

    /// Check signature and expiry
    pub fn validate(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ServiceError::Token(e.to_string())
        })?;

        Ok(Identity::new(data.claims.sub, data.claims.role))
    }
}

/// Extract the token from an `Authorization` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str> {
    let value = header.ok_or_else(|| ServiceError::Token("missing Authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ServiceError::Token("expected 'Authorization: Bearer <token>'".to_string())
        })
}

/// bcrypt-hash a password off the async executor
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(|e| ServiceError::Internal(format!("failed to hash password: {}", e)))
}

/// Compare a password against a stored bcrypt hash
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(|e| ServiceError::Internal(format!("failed to verify password: {}", e)))
}
