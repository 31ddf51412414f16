//! Email verification
//!
//! Each token moves `ISSUED -> VERIFIED` at most once. Failed attempts
//! report the token's state and change nothing.

use chrono::{Duration, Utc};
use serde::Serialize;
use skillswap_core::validation::normalize_email;
use skillswap_core::{NewVerificationToken, Person, TokenStatus, VerificationToken};
use skillswap_repository::{PersonRepository, VerificationRepository};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};
use crate::mailer::MailMessage;

/// Result of a verify or resend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Verified,
    AlreadyVerified,
    ExpiredToken,
    TokenUsed,
    InvalidToken,
    TokenSent,
}

impl VerificationStatus {
    pub fn is_success(self) -> bool {
        matches!(self, VerificationStatus::Verified | VerificationStatus::TokenSent)
    }

    fn message(self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Email address verified",
            VerificationStatus::AlreadyVerified => "Email address is already verified",
            VerificationStatus::ExpiredToken => "Verification token has expired",
            VerificationStatus::TokenUsed => "Verification token has already been used",
            VerificationStatus::InvalidToken => "Verification token is invalid",
            VerificationStatus::TokenSent => "A new verification email has been sent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    pub success: bool,
    pub status: VerificationStatus,
    pub message: String,
}

impl From<VerificationStatus> for VerificationOutcome {
    fn from(status: VerificationStatus) -> Self {
        Self {
            success: status.is_success(),
            status,
            message: status.message().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct VerificationService {
    ctx: ServiceContext,
    // serializes verify/resend so a token cannot be consumed twice
    gate: std::sync::Arc<Mutex<()>>,
}

impl VerificationService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            gate: Default::default(),
        }
    }

    /// Create an `ISSUED` token for `person` and mail the link
    pub async fn issue_token(&self, person: &Person) -> Result<VerificationToken> {
        let ttl = Duration::hours(self.ctx.config.verification_ttl_hours);
        let token = self
            .ctx
            .store
            .insert_token(NewVerificationToken {
                person_id: person.id,
                token: Uuid::new_v4().to_string(),
                expires_at: Utc::now() + ttl,
            })
            .await?;

        let link = format!(
            "{}/verification/verify?token={}",
            self.ctx.config.public_url.trim_end_matches('/'),
            token.token
        );
        self.ctx
            .mailer
            .send(MailMessage {
                from: self.ctx.config.mail_from.clone(),
                to: person.email.clone(),
                subject: "Verify your SkillSwap account".to_string(),
                body: format!(
                    "Hello {},\n\nConfirm your email address by opening {}\n\nThe link expires at {}.",
                    person.display_name, link, token.expires_at
                ),
            })
            .await?;

        info!("Verification token issued for person {}", person.id);
        Ok(token)
    }

    pub async fn verify_token(&self, token: &str) -> Result<VerificationOutcome> {
        let _gate = self.gate.lock().await;
        let store = &self.ctx.store;

        let Some(mut stored) = store.find_token(token).await? else {
            return Ok(VerificationStatus::InvalidToken.into());
        };

        let status = match stored.verify(Utc::now()) {
            Ok(()) => {
                store.update_token(&stored).await?;
                let mut person = store
                    .find_person(stored.person_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("person", stored.person_id))?;
                person.email_verified = true;
                store.update_person(&person).await?;
                info!("Person {} verified their email address", person.id);
                VerificationStatus::Verified
            }
            Err(TokenStatus::Verified) => VerificationStatus::AlreadyVerified,
            Err(TokenStatus::Used) => VerificationStatus::TokenUsed,
            Err(TokenStatus::Expired) => VerificationStatus::ExpiredToken,
            Err(TokenStatus::Issued) => VerificationStatus::InvalidToken,
        };

        if !status.is_success() {
            warn!("Verification rejected for token of person {}: {:?}", stored.person_id, status);
        }
        Ok(status.into())
    }

    /// Invalidate outstanding tokens and issue a fresh one
    pub async fn resend_verification_token(&self, email: &str) -> Result<VerificationOutcome> {
        let _gate = self.gate.lock().await;
        let store = &self.ctx.store;
        let email = normalize_email(email);

        let person = store
            .find_person_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("person", &email))?;
        if person.email_verified {
            return Ok(VerificationStatus::AlreadyVerified.into());
        }

        for mut token in store.list_tokens_for_person(person.id).await? {
            if token.status == TokenStatus::Issued {
                token.invalidate()?;
                store.update_token(&token).await?;
            }
        }

        self.issue_token(&person).await?;
        Ok(VerificationStatus::TokenSent.into())
    }
}
