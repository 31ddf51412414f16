//! Knowledge areas, skills and person/skill associations

use super::{KnowledgeAreaId, PersonId, SkillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level catalog grouping of skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeArea {
    pub id: KnowledgeAreaId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKnowledgeArea {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A teachable skill within one knowledge area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub knowledge_area_id: KnowledgeAreaId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub knowledge_area_id: KnowledgeAreaId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

string_enum! {
    /// Role qualifier on a person/skill association
    pub enum SkillRole {
        Instructor => "INSTRUCTOR",
        Learner => "LEARNER",
    }
}

/// Association between a person and a skill, unique per (person, role, skill)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRoleSkill {
    pub id: i64,
    pub person_id: PersonId,
    pub skill_id: SkillId,
    pub role: SkillRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPersonRoleSkill {
    pub person_id: PersonId,
    pub skill_id: SkillId,
    pub role: SkillRole,
}
