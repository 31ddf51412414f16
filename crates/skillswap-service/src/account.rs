//! Registration, login and account status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillswap_core::validation::{normalize_email, require_non_blank, validate_email, validate_password};
use skillswap_core::{AccountRole, NewPerson, Person, PersonId, RoleProfile};
use skillswap_repository::PersonRepository;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Identity, IssuedToken};
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};
use crate::verification::VerificationService;

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub profile: Option<RoleProfile>,
}

/// Public summary of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub id: PersonId,
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
    pub profile: Option<RoleProfile>,
    pub credits: i64,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Person> for AccountStatus {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            email: person.email,
            display_name: person.display_name,
            role: person.account_role,
            profile: person.profile,
            credits: person.credits,
            email_verified: person.email_verified,
            created_at: person.created_at,
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    ctx: ServiceContext,
    verification: VerificationService,
}

impl AccountService {
    pub(crate) fn new(ctx: ServiceContext, verification: VerificationService) -> Self {
        Self { ctx, verification }
    }

    /// Create an unverified USER account and send its verification token.
    ///
    /// A failed verification mail does not undo the registration; the
    /// person can ask for a new link through the resend operation.
    pub async fn register(&self, account: NewAccount) -> Result<AccountStatus> {
        let email = normalize_email(&account.email);
        validate_email(&email)?;
        validate_password(&account.password)?;
        require_non_blank("displayName", &account.display_name)?;

        let password_hash = hash_password(account.password, self.ctx.config.bcrypt_cost).await?;
        let person = self
            .ctx
            .store
            .insert_person(NewPerson {
                email,
                display_name: account.display_name.trim().to_string(),
                password_hash,
                account_role: AccountRole::User,
                profile: account.profile,
                credits: self.ctx.config.starting_credits,
                email_verified: false,
            })
            .await?;

        if let Err(e) = self.verification.issue_token(&person).await {
            warn!(
                "Verification mail for person {} failed, resend required: {}",
                person.id, e
            );
        }
        info!("Registered person {} ({})", person.id, person.email);
        Ok(person.into())
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let email = normalize_email(email);
        let rejected = || ServiceError::Authentication("invalid email or password".to_string());

        let person = match self.ctx.store.find_person_by_email(&email).await? {
            Some(person) => person,
            None => {
                warn!("Login attempt for unknown email {}", email);
                return Err(rejected());
            }
        };

        if !verify_password(password.to_string(), person.password_hash.clone()).await? {
            warn!("Login failed for person {}", person.id);
            return Err(rejected());
        }

        person
            .ensure_active()
            .map_err(|e| match e {
                skillswap_core::CoreError::Validation { message, .. } => {
                    ServiceError::Authorization(message)
                }
                other => ServiceError::from(other),
            })?;

        let token = self.ctx.tokens.issue(&person)?;
        info!("Person {} logged in", person.id);
        Ok(token)
    }

    /// Summary of the caller's account
    pub async fn status(&self, identity: &Identity) -> Result<AccountStatus> {
        Ok(self.ctx.acting_person(identity).await?.into())
    }

    /// Validate a bearer token
    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        self.ctx.tokens.validate(token)
    }

    /// Create a verified ADMIN account unless the email is already taken
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<AccountStatus> {
        let email = normalize_email(email);
        if let Some(existing) = self.ctx.store.find_person_by_email(&email).await? {
            return Ok(existing.into());
        }
        validate_email(&email)?;
        validate_password(password)?;

        let password_hash = hash_password(password.to_string(), self.ctx.config.bcrypt_cost).await?;
        let person = self
            .ctx
            .store
            .insert_person(NewPerson {
                email,
                display_name: "Administrator".to_string(),
                password_hash,
                account_role: AccountRole::Admin,
                profile: None,
                credits: 0,
                email_verified: true,
            })
            .await?;

        info!("Administrator account {} created", person.email);
        Ok(person.into())
    }
}
