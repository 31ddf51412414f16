//! Configuration types for the SkillSwap services

use serde::{Deserialize, Serialize};

/// Secret used when nothing else is configured. Only suitable for development.
pub const DEV_JWT_SECRET: &str = "skillswap-dev-secret-change-me";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime
    pub token_ttl_minutes: i64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Verification token lifetime
    pub verification_ttl_hours: i64,

    /// Balance granted to newly registered accounts
    pub starting_credits: i64,

    /// Sender address for outgoing mail
    pub mail_from: String,

    /// Base URL used to build verification links
    pub public_url: String,

    /// Allow the development mail endpoint
    pub enable_dev_endpoints: bool,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            verification_ttl_hours: 24,
            starting_credits: 10,
            mail_from: "no-reply@skillswap.local".to_string(),
            public_url: "http://localhost:8080".to_string(),
            enable_dev_endpoints: false,
        }
    }

    /// Set the signing secret
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn with_token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.token_ttl_minutes = minutes;
        self
    }

    /// Set the bcrypt cost (tests use the minimum, 4)
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_verification_ttl_hours(mut self, hours: i64) -> Self {
        self.verification_ttl_hours = hours;
        self
    }

    pub fn with_starting_credits(mut self, credits: i64) -> Self {
        self.starting_credits = credits;
        self
    }

    pub fn with_mail_from(mut self, from: impl Into<String>) -> Self {
        self.mail_from = from.into();
        self
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into();
        self
    }

    /// Enable development endpoints
    pub fn enable_dev_endpoints(mut self, enable: bool) -> Self {
        self.enable_dev_endpoints = enable;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_ttl_minutes, 60);
        assert_eq!(config.verification_ttl_hours, 24);
        assert!(!config.enable_dev_endpoints);
    }

    #[test]
    fn test_builder_methods() {
        let config = ServiceConfig::new()
            .with_jwt_secret("s3cret")
            .with_bcrypt_cost(4)
            .with_starting_credits(25)
            .enable_dev_endpoints(true);

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.starting_credits, 25);
        assert!(config.enable_dev_endpoints);
    }
}
