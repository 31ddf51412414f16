//! Store wrapper that fails selected writes on demand

use async_trait::async_trait;
use skillswap_core::{
    Booking, BookingId, ClassNote, Community, CommunityId, CommunityMembership, Credential,
    CreditPackage, Exchange, ExchangeId, KnowledgeArea, KnowledgeAreaId, LearningSession,
    NewBooking, NewClassNote, NewCommunity, NewCredential, NewCreditPackage, NewExchange,
    NewKnowledgeArea, NewPerson, NewPersonRoleSkill, NewQuiz, NewSession, NewSkill,
    NewTransaction, NewVerificationToken, Person, PersonId, PersonRoleSkill, Quiz, SessionId,
    SessionStatus, SessionSuggestion, Skill, SkillId, Transaction, VerificationToken,
};
use skillswap_repository::{
    BookingRepository, CatalogRepository, CommunityRepository, LedgerRepository, MemoryStore,
    PersonRepository, RepositoryError, RepositoryResult, SessionRepository, Store,
    SuggestionRepository, VerificationRepository,
};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_transactions: AtomicBool,
    fail_booking_updates: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert_transaction` fail until switched off
    pub fn fail_transactions(&self, on: bool) {
        self.fail_transactions.store(on, Ordering::SeqCst);
    }

    /// Make `update_booking` fail until switched off
    pub fn fail_booking_updates(&self, on: bool) {
        self.fail_booking_updates.store(on, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> RepositoryResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(RepositoryError::Other(format!("{} unavailable", op)));
        }
        Ok(())
    }
}

impl Store for FaultyStore {
    fn backend_name(&self) -> &'static str {
        "faulty-memory"
    }
}

#[async_trait]
impl PersonRepository for FaultyStore {
    async fn insert_person(&self, person: NewPerson) -> RepositoryResult<Person> {
        self.inner.insert_person(person).await
    }

    async fn find_person(&self, id: PersonId) -> RepositoryResult<Option<Person>> {
        self.inner.find_person(id).await
    }

    async fn find_person_by_email(&self, email: &str) -> RepositoryResult<Option<Person>> {
        self.inner.find_person_by_email(email).await
    }

    async fn update_person(&self, person: &Person) -> RepositoryResult<()> {
        self.inner.update_person(person).await
    }

    async fn adjust_credits(&self, id: PersonId, delta: i64) -> RepositoryResult<i64> {
        self.inner.adjust_credits(id, delta).await
    }
}

#[async_trait]
impl CatalogRepository for FaultyStore {
    async fn insert_knowledge_area(
        &self,
        area: NewKnowledgeArea,
    ) -> RepositoryResult<KnowledgeArea> {
        self.inner.insert_knowledge_area(area).await
    }

    async fn find_knowledge_area(
        &self,
        id: KnowledgeAreaId,
    ) -> RepositoryResult<Option<KnowledgeArea>> {
        self.inner.find_knowledge_area(id).await
    }

    async fn list_knowledge_areas(&self) -> RepositoryResult<Vec<KnowledgeArea>> {
        self.inner.list_knowledge_areas().await
    }

    async fn insert_skill(&self, skill: NewSkill) -> RepositoryResult<Skill> {
        self.inner.insert_skill(skill).await
    }

    async fn find_skill(&self, id: SkillId) -> RepositoryResult<Option<Skill>> {
        self.inner.find_skill(id).await
    }

    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>> {
        self.inner.list_skills().await
    }

    async fn insert_person_skill(
        &self,
        link: NewPersonRoleSkill,
    ) -> RepositoryResult<PersonRoleSkill> {
        self.inner.insert_person_skill(link).await
    }

    async fn list_person_skills(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<PersonRoleSkill>> {
        self.inner.list_person_skills(person_id).await
    }
}

#[async_trait]
impl SessionRepository for FaultyStore {
    async fn insert_session(
        &self,
        instructor_id: PersonId,
        session: &NewSession,
    ) -> RepositoryResult<LearningSession> {
        self.inner.insert_session(instructor_id, session).await
    }

    async fn find_session(&self, id: SessionId) -> RepositoryResult<Option<LearningSession>> {
        self.inner.find_session(id).await
    }

    async fn update_session_status(
        &self,
        id: SessionId,
        status: SessionStatus,
    ) -> RepositoryResult<()> {
        self.inner.update_session_status(id, status).await
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> RepositoryResult<Vec<LearningSession>> {
        self.inner.list_sessions_by_status(status).await
    }

    async fn list_sessions_by_instructor(
        &self,
        instructor_id: PersonId,
    ) -> RepositoryResult<Vec<LearningSession>> {
        self.inner.list_sessions_by_instructor(instructor_id).await
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        self.inner.delete_session(id).await
    }

    async fn insert_note(&self, note: NewClassNote) -> RepositoryResult<ClassNote> {
        self.inner.insert_note(note).await
    }

    async fn list_notes(&self, session_id: SessionId) -> RepositoryResult<Vec<ClassNote>> {
        self.inner.list_notes(session_id).await
    }

    async fn delete_notes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        self.inner.delete_notes_for_session(session_id).await
    }

    async fn insert_quiz(&self, session_id: SessionId, quiz: &NewQuiz) -> RepositoryResult<Quiz> {
        self.inner.insert_quiz(session_id, quiz).await
    }

    async fn find_quiz(&self, id: i64) -> RepositoryResult<Option<Quiz>> {
        self.inner.find_quiz(id).await
    }

    async fn list_quizzes(&self, session_id: SessionId) -> RepositoryResult<Vec<Quiz>> {
        self.inner.list_quizzes(session_id).await
    }

    async fn delete_quizzes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        self.inner.delete_quizzes_for_session(session_id).await
    }
}

#[async_trait]
impl BookingRepository for FaultyStore {
    async fn insert_booking(&self, booking: NewBooking) -> RepositoryResult<Booking> {
        self.inner.insert_booking(booking).await
    }

    async fn find_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        self.inner.find_booking(id).await
    }

    async fn update_booking(&self, booking: &Booking) -> RepositoryResult<()> {
        Self::check(&self.fail_booking_updates, "update_booking")?;
        self.inner.update_booking(booking).await
    }

    async fn list_bookings_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Booking>> {
        self.inner.list_bookings_for_session(session_id).await
    }

    async fn list_bookings_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Booking>> {
        self.inner.list_bookings_for_person(person_id).await
    }

    async fn count_confirmed(&self, session_id: SessionId) -> RepositoryResult<u32> {
        self.inner.count_confirmed(session_id).await
    }

    async fn delete_bookings_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        self.inner.delete_bookings_for_session(session_id).await
    }
}

#[async_trait]
impl LedgerRepository for FaultyStore {
    async fn insert_exchange(&self, exchange: NewExchange) -> RepositoryResult<Exchange> {
        self.inner.insert_exchange(exchange).await
    }

    async fn find_exchange_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Option<Exchange>> {
        self.inner.find_exchange_for_session(session_id).await
    }

    async fn delete_exchange(&self, id: ExchangeId) -> RepositoryResult<()> {
        self.inner.delete_exchange(id).await
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> RepositoryResult<Transaction> {
        Self::check(&self.fail_transactions, "insert_transaction")?;
        self.inner.insert_transaction(tx).await
    }

    async fn list_transactions(
        &self,
        exchange_id: ExchangeId,
    ) -> RepositoryResult<Vec<Transaction>> {
        self.inner.list_transactions(exchange_id).await
    }

    async fn insert_credit_package(
        &self,
        package: NewCreditPackage,
    ) -> RepositoryResult<CreditPackage> {
        self.inner.insert_credit_package(package).await
    }

    async fn find_credit_package(&self, id: i64) -> RepositoryResult<Option<CreditPackage>> {
        self.inner.find_credit_package(id).await
    }

    async fn list_credit_packages(
        &self,
        active_only: bool,
    ) -> RepositoryResult<Vec<CreditPackage>> {
        self.inner.list_credit_packages(active_only).await
    }
}

#[async_trait]
impl CommunityRepository for FaultyStore {
    async fn insert_community(&self, community: NewCommunity) -> RepositoryResult<Community> {
        self.inner.insert_community(community).await
    }

    async fn find_community(&self, id: CommunityId) -> RepositoryResult<Option<Community>> {
        self.inner.find_community(id).await
    }

    async fn add_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<CommunityMembership> {
        self.inner.add_member(community_id, person_id).await
    }

    async fn list_members(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityMembership>> {
        self.inner.list_members(community_id).await
    }

    async fn list_communities_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Community>> {
        self.inner.list_communities_for_person(person_id).await
    }

    async fn is_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<bool> {
        self.inner.is_member(community_id, person_id).await
    }

    async fn insert_credential(&self, credential: NewCredential) -> RepositoryResult<Credential> {
        self.inner.insert_credential(credential).await
    }

    async fn list_credentials(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<Credential>> {
        self.inner.list_credentials(community_id).await
    }
}

#[async_trait]
impl VerificationRepository for FaultyStore {
    async fn insert_token(
        &self,
        token: NewVerificationToken,
    ) -> RepositoryResult<VerificationToken> {
        self.inner.insert_token(token).await
    }

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<VerificationToken>> {
        self.inner.find_token(token).await
    }

    async fn list_tokens_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<VerificationToken>> {
        self.inner.list_tokens_for_person(person_id).await
    }

    async fn update_token(&self, token: &VerificationToken) -> RepositoryResult<()> {
        self.inner.update_token(token).await
    }
}

#[async_trait]
impl SuggestionRepository for FaultyStore {
    async fn upsert_suggestion(
        &self,
        person_id: PersonId,
        session_id: SessionId,
    ) -> RepositoryResult<SessionSuggestion> {
        self.inner.upsert_suggestion(person_id, session_id).await
    }

    async fn find_suggestion(&self, id: i64) -> RepositoryResult<Option<SessionSuggestion>> {
        self.inner.find_suggestion(id).await
    }

    async fn list_suggestions(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<SessionSuggestion>> {
        self.inner.list_suggestions(person_id).await
    }

    async fn mark_suggestion_viewed(&self, id: i64) -> RepositoryResult<()> {
        self.inner.mark_suggestion_viewed(id).await
    }

    async fn delete_suggestions_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<()> {
        self.inner.delete_suggestions_for_session(session_id).await
    }
}
