//! Core trait definitions for the repository pattern
//!
//! One trait per aggregate, plus the [`Store`] umbrella that every backend
//! implements. All loads are explicit: a lookup returns the record and its
//! foreign keys, never related records.
//!
//! # Constraints enforced by every backend
//!
//! - `Person.email` is unique
//! - at most one non-cancelled booking per (learner, session)
//! - one exchange per session
//! - person/skill associations unique per (person, role, skill)
//! - memberships unique per (community, person)
//! - credentials unique per (community, person, kind)
//! - suggestions unique per (person, session)
//! - `adjust_credits` never leaves a negative balance
//!
//! # Example
//!
//! ```no_run
//! use skillswap_repository::{MemoryStore, PersonRepository};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! if let Some(person) = store.find_person_by_email("ada@example.com").await? {
//!     let balance = store.adjust_credits(person.id, -5).await?;
//!     println!("balance now {}", balance);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use skillswap_core::{
    Booking, BookingId, ClassNote, Community, CommunityId, CommunityMembership, Credential,
    CreditPackage, Exchange, ExchangeId, KnowledgeArea, KnowledgeAreaId, LearningSession,
    NewBooking, NewClassNote, NewCommunity, NewCredential, NewCreditPackage, NewExchange,
    NewKnowledgeArea, NewPerson, NewPersonRoleSkill, NewQuiz, NewSession, NewSkill,
    NewTransaction, NewVerificationToken, Person, PersonId, PersonRoleSkill, Quiz,
    SessionId, SessionStatus, SessionSuggestion, Skill, SkillId, Transaction,
    VerificationToken,
};

use crate::RepositoryResult;

/// People and credit balances
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Insert a person. Fails with `Conflict` if the email is taken.
    async fn insert_person(&self, person: NewPerson) -> RepositoryResult<Person>;

    async fn find_person(&self, id: PersonId) -> RepositoryResult<Option<Person>>;

    /// Lookup by (already normalized) email
    async fn find_person_by_email(&self, email: &str) -> RepositoryResult<Option<Person>>;

    /// Overwrite profile and account flags. The credit balance is not
    /// written here; use [`adjust_credits`](Self::adjust_credits).
    async fn update_person(&self, person: &Person) -> RepositoryResult<()>;

    /// Atomically add `delta` to the balance and return the new balance.
    ///
    /// Fails with `InsufficientCredits` and leaves the balance untouched if
    /// the result would be negative.
    async fn adjust_credits(&self, id: PersonId, delta: i64) -> RepositoryResult<i64>;
}

/// Knowledge areas, skills and person/skill associations
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_knowledge_area(&self, area: NewKnowledgeArea)
        -> RepositoryResult<KnowledgeArea>;
    async fn find_knowledge_area(&self, id: KnowledgeAreaId)
        -> RepositoryResult<Option<KnowledgeArea>>;
    async fn list_knowledge_areas(&self) -> RepositoryResult<Vec<KnowledgeArea>>;

    /// Fails with `Conflict` if the name exists within the same area
    async fn insert_skill(&self, skill: NewSkill) -> RepositoryResult<Skill>;
    async fn find_skill(&self, id: SkillId) -> RepositoryResult<Option<Skill>>;
    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>>;

    /// Fails with `Conflict` on a duplicate (person, role, skill)
    async fn insert_person_skill(&self, link: NewPersonRoleSkill)
        -> RepositoryResult<PersonRoleSkill>;
    async fn list_person_skills(&self, person_id: PersonId)
        -> RepositoryResult<Vec<PersonRoleSkill>>;
}

/// Sessions with their notes and quizzes
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(
        &self,
        instructor_id: PersonId,
        session: &NewSession,
    ) -> RepositoryResult<LearningSession>;
    async fn find_session(&self, id: SessionId) -> RepositoryResult<Option<LearningSession>>;
    async fn update_session_status(
        &self,
        id: SessionId,
        status: SessionStatus,
    ) -> RepositoryResult<()>;
    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> RepositoryResult<Vec<LearningSession>>;
    async fn list_sessions_by_instructor(
        &self,
        instructor_id: PersonId,
    ) -> RepositoryResult<Vec<LearningSession>>;
    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()>;

    async fn insert_note(&self, note: NewClassNote) -> RepositoryResult<ClassNote>;
    async fn list_notes(&self, session_id: SessionId) -> RepositoryResult<Vec<ClassNote>>;
    async fn delete_notes_for_session(&self, session_id: SessionId) -> RepositoryResult<()>;

    async fn insert_quiz(&self, session_id: SessionId, quiz: &NewQuiz) -> RepositoryResult<Quiz>;
    async fn find_quiz(&self, id: i64) -> RepositoryResult<Option<Quiz>>;
    async fn list_quizzes(&self, session_id: SessionId) -> RepositoryResult<Vec<Quiz>>;
    async fn delete_quizzes_for_session(&self, session_id: SessionId) -> RepositoryResult<()>;
}

/// Bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Fails with `Conflict` if the learner already holds a non-cancelled
    /// booking for the session.
    async fn insert_booking(&self, booking: NewBooking) -> RepositoryResult<Booking>;
    async fn find_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>>;

    /// Persist status and cancellation time
    async fn update_booking(&self, booking: &Booking) -> RepositoryResult<()>;

    async fn list_bookings_for_session(&self, session_id: SessionId)
        -> RepositoryResult<Vec<Booking>>;
    async fn list_bookings_for_person(&self, person_id: PersonId)
        -> RepositoryResult<Vec<Booking>>;

    /// Live count of `CONFIRMED` bookings
    async fn count_confirmed(&self, session_id: SessionId) -> RepositoryResult<u32>;

    async fn delete_bookings_for_session(&self, session_id: SessionId) -> RepositoryResult<()>;
}

/// Exchanges, their transactions, and credit packages
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Fails with `Conflict` if the session already has an exchange
    async fn insert_exchange(&self, exchange: NewExchange) -> RepositoryResult<Exchange>;
    async fn find_exchange_for_session(&self, session_id: SessionId)
        -> RepositoryResult<Option<Exchange>>;

    /// Deletes the exchange and all of its transactions
    async fn delete_exchange(&self, id: ExchangeId) -> RepositoryResult<()>;

    /// Append a ledger entry. Entries are never updated.
    async fn insert_transaction(&self, tx: NewTransaction) -> RepositoryResult<Transaction>;
    async fn list_transactions(&self, exchange_id: ExchangeId)
        -> RepositoryResult<Vec<Transaction>>;

    async fn insert_credit_package(&self, package: NewCreditPackage)
        -> RepositoryResult<CreditPackage>;
    async fn find_credit_package(&self, id: i64) -> RepositoryResult<Option<CreditPackage>>;
    async fn list_credit_packages(&self, active_only: bool)
        -> RepositoryResult<Vec<CreditPackage>>;
}

/// Communities, memberships and credentials
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    async fn insert_community(&self, community: NewCommunity) -> RepositoryResult<Community>;
    async fn find_community(&self, id: CommunityId) -> RepositoryResult<Option<Community>>;

    /// Fails with `Conflict` if already a member
    async fn add_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<CommunityMembership>;
    async fn list_members(&self, community_id: CommunityId)
        -> RepositoryResult<Vec<CommunityMembership>>;
    async fn list_communities_for_person(&self, person_id: PersonId)
        -> RepositoryResult<Vec<Community>>;
    async fn is_member(&self, community_id: CommunityId, person_id: PersonId)
        -> RepositoryResult<bool>;

    /// Fails with `Conflict` on a duplicate (community, person, kind)
    async fn insert_credential(&self, credential: NewCredential) -> RepositoryResult<Credential>;
    async fn list_credentials(&self, community_id: CommunityId)
        -> RepositoryResult<Vec<Credential>>;
}

/// Email verification tokens
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn insert_token(&self, token: NewVerificationToken)
        -> RepositoryResult<VerificationToken>;
    async fn find_token(&self, token: &str) -> RepositoryResult<Option<VerificationToken>>;
    async fn list_tokens_for_person(&self, person_id: PersonId)
        -> RepositoryResult<Vec<VerificationToken>>;

    /// Persist status and verification time
    async fn update_token(&self, token: &VerificationToken) -> RepositoryResult<()>;
}

/// Session suggestions
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// Insert the (person, session) row if absent; an existing row keeps its
    /// `viewed` flag.
    async fn upsert_suggestion(
        &self,
        person_id: PersonId,
        session_id: SessionId,
    ) -> RepositoryResult<SessionSuggestion>;
    async fn find_suggestion(&self, id: i64) -> RepositoryResult<Option<SessionSuggestion>>;
    async fn list_suggestions(&self, person_id: PersonId)
        -> RepositoryResult<Vec<SessionSuggestion>>;
    async fn mark_suggestion_viewed(&self, id: i64) -> RepositoryResult<()>;
    async fn delete_suggestions_for_session(&self, session_id: SessionId)
        -> RepositoryResult<()>;
}

/// Everything the service layer needs from a backend
pub trait Store:
    PersonRepository
    + CatalogRepository
    + SessionRepository
    + BookingRepository
    + LedgerRepository
    + CommunityRepository
    + VerificationRepository
    + SuggestionRepository
{
    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
