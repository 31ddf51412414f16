//! Builder pattern for SkillSwap

use skillswap_repository::{StoreConfig, Store};
use std::sync::Arc;
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::ServiceConfig;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::locks::SessionLocks;
use crate::mailer::{LogMailer, Mailer};
use crate::skillswap::SkillSwap;

/// Builder for [`SkillSwap`]
///
/// # Example
///
/// ```rust,ignore
/// use skillswap_service::{ServiceConfig, SkillSwapBuilder};
/// use skillswap_repository::StoreConfig;
///
/// // In-memory store, mail written to the log
/// let app = SkillSwapBuilder::new().build().await?;
///
/// // PostgreSQL
/// let app = SkillSwapBuilder::new()
///     .with_store_config(StoreConfig::postgres("postgresql://localhost/skillswap"))
///     .with_config(ServiceConfig::new().with_jwt_secret("change-me"))
///     .build()
///     .await?;
/// ```
pub struct SkillSwapBuilder {
    config: ServiceConfig,
    store_config: StoreConfig,
    store: Option<Arc<dyn Store>>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl SkillSwapBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::new(),
            store_config: StoreConfig::memory(),
            store: None,
            mailer: None,
        }
    }

    /// Set service configuration
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Open the store from configuration at build time
    pub fn with_store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Use an already opened store (takes precedence over the store config)
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the mail transport (defaults to [`LogMailer`])
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub async fn build(self) -> Result<SkillSwap> {
        let store = match self.store {
            Some(store) => store,
            None => self.store_config.open().await?,
        };
        let mailer = self.mailer.unwrap_or_else(|| Arc::new(LogMailer));

        info!("Building SkillSwap services on {} store", store.backend_name());

        let tokens = TokenIssuer::new(&self.config.jwt_secret, self.config.token_ttl_minutes);
        let ctx = ServiceContext {
            store,
            config: Arc::new(self.config),
            mailer,
            locks: Arc::new(SessionLocks::new()),
            tokens,
        };
        Ok(SkillSwap::new(ctx))
    }
}

impl Default for SkillSwapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
