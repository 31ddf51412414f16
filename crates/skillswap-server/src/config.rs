//! Server configuration

use serde::{Deserialize, Serialize};
use skillswap_repository::StoreConfig;
use skillswap_service::config::DEV_JWT_SECRET;
use skillswap_service::ServiceConfig;

/// Environment variable that overrides `auth.jwt_secret`
pub const JWT_SECRET_ENV: &str = "SKILLSWAP_JWT_SECRET";

/// Bearer token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let service = ServiceConfig::new();
        Self {
            jwt_secret: service.jwt_secret,
            token_ttl_minutes: service.token_ttl_minutes,
            bcrypt_cost: service.bcrypt_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub token_ttl_hours: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { token_ttl_hours: 24 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Sender address
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: ServiceConfig::new().mail_from,
        }
    }
}

/// Administrator created at startup when missing
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// `text` or `json`
    pub log_format: String,

    /// Storage backend
    pub storage: StoreConfig,

    pub auth: AuthConfig,

    pub verification: VerificationConfig,

    /// Balance granted to new accounts
    pub starting_credits: i64,

    /// Expose `/api/dev/*`
    pub enable_dev_endpoints: bool,

    pub mail: MailConfig,

    /// Base URL put into verification links
    pub public_url: String,

    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            storage: StoreConfig::memory(),
            auth: AuthConfig::default(),
            verification: VerificationConfig::default(),
            starting_credits: 10,
            enable_dev_endpoints: false,
            mail: MailConfig::default(),
            public_url: "http://localhost:8080".to_string(),
            admin: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("SKILLSWAP").separator("__"))
            .build();

        let mut config = match config_result {
            Ok(cfg) => cfg
                .try_deserialize::<ServerConfig>()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))?,
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Self::default()
            }
        };

        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            config.auth.jwt_secret = secret;
        }
        if config.auth.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!(
                "Using the development JWT secret; set {} for real deployments",
                JWT_SECRET_ENV
            );
        }

        config.storage.validate()?;
        Ok(config)
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings handed to the service layer
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new()
            .with_jwt_secret(self.auth.jwt_secret.clone())
            .with_token_ttl_minutes(self.auth.token_ttl_minutes)
            .with_bcrypt_cost(self.auth.bcrypt_cost)
            .with_verification_ttl_hours(self.verification.token_ttl_hours)
            .with_starting_credits(self.starting_credits)
            .with_mail_from(self.mail.from.clone())
            .with_public_url(self.public_url.clone())
            .enable_dev_endpoints(self.enable_dev_endpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_repository::StoreSource;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.storage.source, StoreSource::Memory);
        assert!(!config.enable_dev_endpoints);
        assert!(config.admin.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_service_config_conversion() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "s3cret".to_string();
        config.auth.bcrypt_cost = 4;
        config.verification.token_ttl_hours = 2;
        config.starting_credits = 25;
        config.enable_dev_endpoints = true;

        let service = config.service_config();
        assert_eq!(service.jwt_secret, "s3cret");
        assert_eq!(service.bcrypt_cost, 4);
        assert_eq!(service.verification_ttl_hours, 2);
        assert_eq!(service.starting_credits, 25);
        assert!(service.enable_dev_endpoints);
    }

    #[test]
    fn test_admin_password_not_in_debug_output() {
        let admin = AdminConfig {
            email: "root@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        let debug_str = format!("{:?}", admin);
        assert!(debug_str.contains("root@example.com"));
        assert!(!debug_str.contains("hunter22"));
    }
}
