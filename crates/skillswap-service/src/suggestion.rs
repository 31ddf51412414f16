//! Session suggestions
//!
//! Open sessions are ranked by how many of the caller's learner skills and
//! knowledge areas the instructor covers. Scores are computed on every call;
//! only the (person, session) row and its `viewed` flag are stored.

use serde::Serialize;
use skillswap_core::{
    overlap_score, KnowledgeAreaId, PersonId, PersonRoleSkill, SessionStatus, SkillId, SkillRole,
};
use skillswap_repository::{
    BookingRepository, CatalogRepository, SessionRepository, SuggestionRepository,
};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};
use crate::session::{build_view, SessionView};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSession {
    pub suggestion_id: i64,
    pub score: usize,
    pub viewed: bool,
    pub session: SessionView,
}

#[derive(Clone)]
pub struct SuggestionService {
    ctx: ServiceContext,
}

impl SuggestionService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ranked by score desc, then `starts_at` asc, then session id asc.
    ///
    /// Excludes sessions the caller teaches or has an active booking for,
    /// sessions without free seats, and sessions scoring zero.
    pub async fn suggest_sessions(&self, identity: &Identity) -> Result<Vec<SuggestedSession>> {
        let store = &self.ctx.store;
        let person = self.ctx.acting_person(identity).await?;

        let skill_areas: HashMap<SkillId, KnowledgeAreaId> = store
            .list_skills()
            .await?
            .into_iter()
            .map(|s| (s.id, s.knowledge_area_id))
            .collect();

        let (learner_skills, learner_areas) = role_sets(
            &store.list_person_skills(person.id).await?,
            SkillRole::Learner,
            &skill_areas,
        );
        if learner_skills.is_empty() {
            return Ok(Vec::new());
        }

        let booked: HashSet<_> = store
            .list_bookings_for_person(person.id)
            .await?
            .into_iter()
            .filter(|b| b.is_active())
            .map(|b| b.session_id)
            .collect();

        let mut instructors: HashMap<PersonId, (HashSet<SkillId>, HashSet<KnowledgeAreaId>)> =
            HashMap::new();
        let mut ranked = Vec::new();

        for session in store.list_sessions_by_status(SessionStatus::Open).await? {
            if session.instructor_id == person.id || booked.contains(&session.id) {
                continue;
            }
            let confirmed = store.count_confirmed(session.id).await?;
            if session.available_capacity(confirmed) == 0 {
                continue;
            }

            if !instructors.contains_key(&session.instructor_id) {
                let links = store.list_person_skills(session.instructor_id).await?;
                instructors.insert(
                    session.instructor_id,
                    role_sets(&links, SkillRole::Instructor, &skill_areas),
                );
            }
            let Some((teaches, areas)) = instructors.get(&session.instructor_id) else {
                continue;
            };

            let mut areas = areas.clone();
            if let Some(area) = skill_areas.get(&session.skill_id) {
                areas.insert(*area);
            }

            let score = overlap_score(
                &learner_skills,
                &learner_areas,
                teaches,
                &areas,
                session.skill_id,
            );
            if score > 0 {
                ranked.push((score, session));
            }
        }

        ranked.sort_by_key(|(score, s)| (Reverse(*score), s.starts_at, s.id));

        let mut suggestions = Vec::with_capacity(ranked.len());
        for (score, session) in ranked {
            let row = store.upsert_suggestion(person.id, session.id).await?;
            suggestions.push(SuggestedSession {
                suggestion_id: row.id,
                score,
                viewed: row.viewed,
                session: build_view(&self.ctx, session).await?,
            });
        }

        debug!(
            "{} suggestions for person {}",
            suggestions.len(),
            person.id
        );
        Ok(suggestions)
    }

    /// Flag a suggestion as seen by its owner
    pub async fn mark_viewed(&self, suggestion_id: i64, identity: &Identity) -> Result<()> {
        let person = self.ctx.acting_person(identity).await?;
        let suggestion = self
            .ctx
            .store
            .find_suggestion(suggestion_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("suggestion", suggestion_id))?;

        if suggestion.person_id != person.id {
            return Err(ServiceError::forbidden(format!(
                "suggestion {} belongs to another person",
                suggestion_id
            )));
        }
        self.ctx.store.mark_suggestion_viewed(suggestion_id).await?;
        Ok(())
    }
}

/// Skill ids held under `role` and the knowledge areas they belong to
fn role_sets(
    links: &[PersonRoleSkill],
    role: SkillRole,
    skill_areas: &HashMap<SkillId, KnowledgeAreaId>,
) -> (HashSet<SkillId>, HashSet<KnowledgeAreaId>) {
    let skills: HashSet<SkillId> = links
        .iter()
        .filter(|l| l.role == role)
        .map(|l| l.skill_id)
        .collect();
    let areas = skills
        .iter()
        .filter_map(|id| skill_areas.get(id).copied())
        .collect();
    (skills, areas)
}
