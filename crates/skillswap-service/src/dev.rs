//! Development helpers, disabled unless `enable_dev_endpoints` is set

use skillswap_core::validation::validate_email;
use tracing::info;

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};
use crate::mailer::MailMessage;

#[derive(Clone)]
pub struct DevService {
    ctx: ServiceContext,
}

impl DevService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn enabled(&self) -> bool {
        self.ctx.config.enable_dev_endpoints
    }

    /// Send a test message through the configured mailer
    pub async fn send_test_mail(&self, identity: &Identity, to: &str) -> Result<()> {
        if !self.enabled() {
            return Err(ServiceError::NotFound("dev endpoints are disabled".to_string()));
        }
        self.ctx.acting_person(identity).await?;
        validate_email(to)?;

        self.ctx
            .mailer
            .send(MailMessage {
                from: self.ctx.config.mail_from.clone(),
                to: to.to_string(),
                subject: "SkillSwap test mail".to_string(),
                body: "Mail delivery is working.".to_string(),
            })
            .await?;
        info!("Test mail sent to {}", to);
        Ok(())
    }
}
