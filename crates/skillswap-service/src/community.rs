//! Communities and derived credentials

use serde::Deserialize;
use skillswap_core::validation::require_non_blank;
use skillswap_core::{
    BookingStatus, Community, CommunityId, CommunityMembership, Credential, CredentialKind,
    NewCommunity, NewCredential, PersonId, SessionStatus,
};
use skillswap_repository::{
    BookingRepository, CommunityRepository, RepositoryError, SessionRepository,
};
use tracing::{debug, info};

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommunity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CommunityService {
    ctx: ServiceContext,
}

impl CommunityService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create_community(
        &self,
        identity: &Identity,
        request: CreateCommunity,
    ) -> Result<Community> {
        identity.require_admin()?;
        require_non_blank("name", &request.name)?;

        let community = self
            .ctx
            .store
            .insert_community(NewCommunity {
                name: request.name,
                description: request.description,
            })
            .await?;
        info!("Community {} created: {}", community.id, community.name);
        Ok(community)
    }

    pub async fn join_community(
        &self,
        community_id: CommunityId,
        identity: &Identity,
    ) -> Result<CommunityMembership> {
        let person = self.ctx.acting_person(identity).await?;
        self.require_community(community_id).await?;
        Ok(self.ctx.store.add_member(community_id, person.id).await?)
    }

    pub async fn my_communities(&self, identity: &Identity) -> Result<Vec<Community>> {
        let person = self.ctx.acting_person(identity).await?;
        Ok(self.ctx.store.list_communities_for_person(person.id).await?)
    }

    /// Credentials held in a community, derived from completed sessions.
    ///
    /// Only members may look. Newly earned credentials are stored once.
    pub async fn credentials(
        &self,
        community_id: CommunityId,
        identity: &Identity,
    ) -> Result<Vec<Credential>> {
        let person = self.ctx.acting_person(identity).await?;
        self.require_community(community_id).await?;
        if !self.ctx.store.is_member(community_id, person.id).await? {
            return Err(ServiceError::forbidden(format!(
                "not a member of community {}",
                community_id
            )));
        }

        let held = self.ctx.store.list_credentials(community_id).await?;
        for member in self.ctx.store.list_members(community_id).await? {
            let (attended, taught) = self.completed_counts(member.person_id).await?;
            for kind in CredentialKind::earned(attended, taught) {
                let already = held
                    .iter()
                    .any(|c| c.person_id == member.person_id && c.kind == kind);
                if already {
                    continue;
                }
                self.issue(community_id, member.person_id, kind).await?;
            }
        }

        Ok(self.ctx.store.list_credentials(community_id).await?)
    }

    async fn issue(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
        kind: CredentialKind,
    ) -> Result<()> {
        match self
            .ctx
            .store
            .insert_credential(NewCredential {
                community_id,
                person_id,
                kind,
            })
            .await
        {
            Ok(_) => {
                info!("Credential {} issued to person {}", kind, person_id);
                Ok(())
            }
            // a concurrent read issued it first
            Err(RepositoryError::Conflict(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Completed sessions attended with a confirmed booking, and taught
    async fn completed_counts(&self, person_id: PersonId) -> Result<(usize, usize)> {
        let store = &self.ctx.store;

        let mut attended = 0;
        for booking in store.list_bookings_for_person(person_id).await? {
            if booking.status != BookingStatus::Confirmed {
                continue;
            }
            if let Some(session) = store.find_session(booking.session_id).await? {
                if session.status == SessionStatus::Completed {
                    attended += 1;
                }
            }
        }

        let taught = store
            .list_sessions_by_instructor(person_id)
            .await?
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .count();

        debug!(
            "Person {} attended {} and taught {} completed sessions",
            person_id, attended, taught
        );
        Ok((attended, taught))
    }

    async fn require_community(&self, id: CommunityId) -> Result<Community> {
        self.ctx
            .store
            .find_community(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("community", id))
    }
}
