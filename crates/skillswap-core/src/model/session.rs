//! Learning session definitions
//!
//! A session is created as `DRAFT`, opened for bookings, and eventually
//! completed or cancelled. `FULL` is never stored: it is derived from the
//! live confirmed-booking count, see [`LearningSession::effective_status`].

use super::exchange::ExchangeType;
use super::{PersonId, SessionId, SkillId};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Session lifecycle state
    pub enum SessionStatus {
        Draft => "DRAFT",
        Open => "OPEN",
        /// Derived only, never persisted
        Full => "FULL",
        Closed => "CLOSED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl SessionStatus {
    /// Whether a stored session may move from `self` to `next`
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Draft, Open)
                | (Open, Closed)
                | (Closed, Open)
                | (Open, Completed)
                | (Closed, Completed)
                | (Draft, Cancelled)
                | (Open, Cancelled)
                | (Closed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// A scheduled teaching slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSession {
    pub id: SessionId,
    pub instructor_id: PersonId,
    pub skill_id: SkillId,
    pub title: String,
    pub description: Option<String>,

    /// Maximum number of confirmed bookings
    pub capacity: u32,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl LearningSession {
    /// Apply a lifecycle transition
    pub fn transition(&mut self, next: SessionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "session",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Remaining seats given the live confirmed count
    pub fn available_capacity(&self, confirmed: u32) -> u32 {
        self.capacity.saturating_sub(confirmed)
    }

    /// Status as seen by clients, with `FULL` derived from the live count
    pub fn effective_status(&self, confirmed: u32) -> SessionStatus {
        if self.status == SessionStatus::Open && self.available_capacity(confirmed) == 0 {
            SessionStatus::Full
        } else {
            self.status
        }
    }
}

/// Insert payload for a session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub skill_id: SkillId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub capacity: u32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_exchange_type")]
    pub exchange_type: ExchangeType,
    #[serde(default)]
    pub credits_cost: i64,
}

fn default_exchange_type() -> ExchangeType {
    ExchangeType::Paid
}

/// Instructor note attached to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNote {
    pub id: i64,
    pub session_id: SessionId,
    pub author_id: PersonId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClassNote {
    pub session_id: SessionId,
    pub author_id: PersonId,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(capacity: u32, status: SessionStatus) -> LearningSession {
        let now = Utc::now();
        LearningSession {
            id: 1,
            instructor_id: 7,
            skill_id: 3,
            title: "Intro to Rust".to_string(),
            description: None,
            capacity,
            starts_at: now,
            ends_at: now + Duration::hours(1),
            status,
            created_at: now,
        }
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut s = session(2, SessionStatus::Draft);
        s.transition(SessionStatus::Open).unwrap();
        s.transition(SessionStatus::Closed).unwrap();
        s.transition(SessionStatus::Completed).unwrap();
        assert!(s.status.is_terminal());
    }

    #[test]
    fn test_full_is_never_a_stored_transition() {
        let mut s = session(1, SessionStatus::Open);
        assert!(s.transition(SessionStatus::Full).is_err());
        assert_eq!(s.status, SessionStatus::Open);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut s = session(1, SessionStatus::Cancelled);
        let err = s.transition(SessionStatus::Open).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid session transition from CANCELLED to OPEN"
        );
    }

    #[test]
    fn test_effective_status_derives_full() {
        let s = session(2, SessionStatus::Open);
        assert_eq!(s.effective_status(1), SessionStatus::Open);
        assert_eq!(s.effective_status(2), SessionStatus::Full);
        assert_eq!(s.available_capacity(3), 0);
    }

    #[test]
    fn test_closed_session_not_reported_full() {
        let s = session(1, SessionStatus::Closed);
        assert_eq!(s.effective_status(1), SessionStatus::Closed);
    }
}
