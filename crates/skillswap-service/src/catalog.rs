//! Knowledge areas, skills and person/skill declarations

use serde::Deserialize;
use skillswap_core::validation::require_non_blank;
use skillswap_core::{
    KnowledgeArea, NewKnowledgeArea, NewPersonRoleSkill, NewSkill, PersonRoleSkill, Skill,
    SkillId, SkillRole,
};
use skillswap_repository::CatalogRepository;
use tracing::info;

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};

/// Request to declare a skill for the caller
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareSkill {
    pub skill_id: SkillId,
    pub role: SkillRole,
}

#[derive(Clone)]
pub struct CatalogService {
    ctx: ServiceContext,
}

impl CatalogService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list_knowledge_areas(&self) -> Result<Vec<KnowledgeArea>> {
        Ok(self.ctx.store.list_knowledge_areas().await?)
    }

    pub async fn create_knowledge_area(
        &self,
        identity: &Identity,
        area: NewKnowledgeArea,
    ) -> Result<KnowledgeArea> {
        identity.require_admin()?;
        require_non_blank("name", &area.name)?;

        let area = self.ctx.store.insert_knowledge_area(area).await?;
        info!("Knowledge area {} created: {}", area.id, area.name);
        Ok(area)
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        Ok(self.ctx.store.list_skills().await?)
    }

    pub async fn create_skill(&self, identity: &Identity, skill: NewSkill) -> Result<Skill> {
        identity.require_admin()?;
        require_non_blank("name", &skill.name)?;
        if self
            .ctx
            .store
            .find_knowledge_area(skill.knowledge_area_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("knowledge area", skill.knowledge_area_id));
        }

        let skill = self.ctx.store.insert_skill(skill).await?;
        info!("Skill {} created: {}", skill.id, skill.name);
        Ok(skill)
    }

    /// Declare that the caller teaches or wants to learn a skill
    pub async fn declare_skill(
        &self,
        identity: &Identity,
        request: DeclareSkill,
    ) -> Result<PersonRoleSkill> {
        let person = self.ctx.acting_person(identity).await?;
        if self.ctx.store.find_skill(request.skill_id).await?.is_none() {
            return Err(ServiceError::not_found("skill", request.skill_id));
        }

        Ok(self
            .ctx
            .store
            .insert_person_skill(NewPersonRoleSkill {
                person_id: person.id,
                skill_id: request.skill_id,
                role: request.role,
            })
            .await?)
    }

    pub async fn list_my_skills(&self, identity: &Identity) -> Result<Vec<PersonRoleSkill>> {
        let person = self.ctx.acting_person(identity).await?;
        Ok(self.ctx.store.list_person_skills(person.id).await?)
    }
}
