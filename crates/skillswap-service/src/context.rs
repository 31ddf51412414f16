//! Shared state handed to every service

use skillswap_core::{LearningSession, Person, SessionId};
use skillswap_repository::{PersonRepository, SessionRepository, Store};
use std::sync::Arc;

use crate::auth::{Identity, TokenIssuer};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::locks::SessionLocks;
use crate::mailer::Mailer;

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServiceConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub locks: Arc<SessionLocks>,
    pub tokens: TokenIssuer,
}

impl ServiceContext {
    /// Resolve the caller to a stored person that may still act
    pub async fn acting_person(&self, identity: &Identity) -> Result<Person> {
        let person = self
            .store
            .find_person_by_email(&identity.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("person", &identity.email))?;

        if person.locked || !person.enabled {
            return Err(ServiceError::forbidden("account is disabled or locked"));
        }
        Ok(person)
    }

    pub async fn require_session(&self, id: SessionId) -> Result<LearningSession> {
        self.store
            .find_session(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("session", id))
    }

    /// Load a session and check that `person` teaches it
    pub async fn owned_session(&self, id: SessionId, person: &Person) -> Result<LearningSession> {
        let session = self.require_session(id).await?;
        if session.instructor_id != person.id {
            return Err(ServiceError::forbidden(format!(
                "only the instructor may manage session {}",
                id
            )));
        }
        Ok(session)
    }
}
