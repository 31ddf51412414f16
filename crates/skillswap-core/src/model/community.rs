//! Communities and derived credentials

use super::{CommunityId, PersonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub description: Option<String>,
}

/// Membership of a person in a community, unique per pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMembership {
    pub community_id: CommunityId,
    pub person_id: PersonId,
    pub joined_at: DateTime<Utc>,
}

string_enum! {
    /// Badge kinds derived from completed sessions
    pub enum CredentialKind {
        LearnerFirstSession => "LEARNER_FIRST_SESSION",
        DedicatedLearner => "DEDICATED_LEARNER",
        Mentor => "MENTOR",
        ExpertMentor => "EXPERT_MENTOR",
    }
}

impl CredentialKind {
    pub const DEDICATED_THRESHOLD: usize = 5;
    pub const EXPERT_THRESHOLD: usize = 5;

    pub fn title(&self) -> &'static str {
        match self {
            CredentialKind::LearnerFirstSession => "First Session Completed",
            CredentialKind::DedicatedLearner => "Dedicated Learner",
            CredentialKind::Mentor => "Mentor",
            CredentialKind::ExpertMentor => "Expert Mentor",
        }
    }

    /// Kinds earned for the given counts of completed sessions
    pub fn earned(attended: usize, taught: usize) -> Vec<CredentialKind> {
        let mut kinds = Vec::new();
        if attended >= 1 {
            kinds.push(CredentialKind::LearnerFirstSession);
        }
        if attended >= Self::DEDICATED_THRESHOLD {
            kinds.push(CredentialKind::DedicatedLearner);
        }
        if taught >= 1 {
            kinds.push(CredentialKind::Mentor);
        }
        if taught >= Self::EXPERT_THRESHOLD {
            kinds.push(CredentialKind::ExpertMentor);
        }
        kinds
    }
}

/// Badge held by a community member, unique per (community, person, kind)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: i64,
    pub community_id: CommunityId,
    pub person_id: PersonId,
    pub kind: CredentialKind,
    pub title: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCredential {
    pub community_id: CommunityId,
    pub person_id: PersonId,
    pub kind: CredentialKind,
}
