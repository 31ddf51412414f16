//! Session suggestions

use super::{KnowledgeAreaId, PersonId, SessionId, SkillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Suggestion row, unique per (person, session). Only `viewed` is persisted;
/// scores are recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSuggestion {
    pub id: i64,
    pub person_id: PersonId,
    pub session_id: SessionId,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
}

/// Overlap-count heuristic between a learner and a session's instructor.
///
/// The session's own skill counts as one of the instructor's skills.
pub fn overlap_score(
    learner_skills: &HashSet<SkillId>,
    learner_areas: &HashSet<KnowledgeAreaId>,
    instructor_skills: &HashSet<SkillId>,
    instructor_areas: &HashSet<KnowledgeAreaId>,
    session_skill: SkillId,
) -> usize {
    let mut offered: HashSet<SkillId> = instructor_skills.clone();
    offered.insert(session_skill);

    let skill_overlap = learner_skills.intersection(&offered).count();
    let area_overlap = learner_areas.intersection(instructor_areas).count();
    skill_overlap + area_overlap
}
