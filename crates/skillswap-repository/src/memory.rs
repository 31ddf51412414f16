//! In-memory repository implementation
//!
//! All tables live behind a single `tokio::sync::RwLock`, so every trait
//! method is atomic with respect to every other. Unique constraints and the
//! non-negative balance are checked under the write lock, mirroring what the
//! relational schema enforces in [`PostgresStore`](crate::PostgresStore).

use async_trait::async_trait;
use chrono::Utc;
use skillswap_core::*;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{error::RepositoryError, traits::*, RepositoryResult};

#[derive(Default)]
struct Tables {
    sequence: i64,
    people: BTreeMap<PersonId, Person>,
    knowledge_areas: BTreeMap<KnowledgeAreaId, KnowledgeArea>,
    skills: BTreeMap<SkillId, Skill>,
    person_skills: BTreeMap<i64, PersonRoleSkill>,
    sessions: BTreeMap<SessionId, LearningSession>,
    notes: BTreeMap<i64, ClassNote>,
    quizzes: BTreeMap<i64, Quiz>,
    bookings: BTreeMap<BookingId, Booking>,
    exchanges: BTreeMap<ExchangeId, Exchange>,
    transactions: BTreeMap<i64, Transaction>,
    credit_packages: BTreeMap<i64, CreditPackage>,
    communities: BTreeMap<CommunityId, Community>,
    memberships: Vec<CommunityMembership>,
    credentials: BTreeMap<i64, Credential>,
    tokens: BTreeMap<i64, VerificationToken>,
    suggestions: BTreeMap<i64, SessionSuggestion>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }
}

/// In-memory store, the default backend
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl PersonRepository for MemoryStore {
    async fn insert_person(&self, person: NewPerson) -> RepositoryResult<Person> {
        let mut t = self.tables.write().await;
        if t.people.values().any(|p| p.email == person.email) {
            return Err(RepositoryError::Conflict(format!(
                "email already registered: {}",
                person.email
            )));
        }

        let id = t.next_id();
        let person = Person {
            id,
            email: person.email,
            display_name: person.display_name,
            password_hash: person.password_hash,
            account_role: person.account_role,
            profile: person.profile,
            credits: person.credits,
            email_verified: person.email_verified,
            enabled: true,
            locked: false,
            created_at: Utc::now(),
        };
        t.people.insert(id, person.clone());
        Ok(person)
    }

    async fn find_person(&self, id: PersonId) -> RepositoryResult<Option<Person>> {
        Ok(self.tables.read().await.people.get(&id).cloned())
    }

    async fn find_person_by_email(&self, email: &str) -> RepositoryResult<Option<Person>> {
        let t = self.tables.read().await;
        Ok(t.people.values().find(|p| p.email == email).cloned())
    }

    async fn update_person(&self, person: &Person) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let stored = t
            .people
            .get_mut(&person.id)
            .ok_or_else(|| RepositoryError::not_found("person", person.id))?;

        let credits = stored.credits;
        *stored = person.clone();
        stored.credits = credits;
        Ok(())
    }

    async fn adjust_credits(&self, id: PersonId, delta: i64) -> RepositoryResult<i64> {
        let mut t = self.tables.write().await;
        let person = t
            .people
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("person", id))?;

        let balance = person.credits + delta;
        if balance < 0 {
            return Err(RepositoryError::InsufficientCredits {
                person_id: id,
                balance: person.credits,
                requested: -delta,
            });
        }
        person.credits = balance;
        Ok(balance)
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn insert_knowledge_area(
        &self,
        area: NewKnowledgeArea,
    ) -> RepositoryResult<KnowledgeArea> {
        let mut t = self.tables.write().await;
        if t.knowledge_areas.values().any(|a| a.name == area.name) {
            return Err(RepositoryError::Conflict(format!(
                "knowledge area already exists: {}",
                area.name
            )));
        }

        let id = t.next_id();
        let area = KnowledgeArea {
            id,
            name: area.name,
            description: area.description,
        };
        t.knowledge_areas.insert(id, area.clone());
        Ok(area)
    }

    async fn find_knowledge_area(
        &self,
        id: KnowledgeAreaId,
    ) -> RepositoryResult<Option<KnowledgeArea>> {
        Ok(self.tables.read().await.knowledge_areas.get(&id).cloned())
    }

    async fn list_knowledge_areas(&self) -> RepositoryResult<Vec<KnowledgeArea>> {
        Ok(self.tables.read().await.knowledge_areas.values().cloned().collect())
    }

    async fn insert_skill(&self, skill: NewSkill) -> RepositoryResult<Skill> {
        let mut t = self.tables.write().await;
        if !t.knowledge_areas.contains_key(&skill.knowledge_area_id) {
            return Err(RepositoryError::not_found(
                "knowledge area",
                skill.knowledge_area_id,
            ));
        }
        if t
            .skills
            .values()
            .any(|s| s.knowledge_area_id == skill.knowledge_area_id && s.name == skill.name)
        {
            return Err(RepositoryError::Conflict(format!(
                "skill already exists in area: {}",
                skill.name
            )));
        }

        let id = t.next_id();
        let skill = Skill {
            id,
            knowledge_area_id: skill.knowledge_area_id,
            name: skill.name,
            description: skill.description,
        };
        t.skills.insert(id, skill.clone());
        Ok(skill)
    }

    async fn find_skill(&self, id: SkillId) -> RepositoryResult<Option<Skill>> {
        Ok(self.tables.read().await.skills.get(&id).cloned())
    }

    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>> {
        Ok(self.tables.read().await.skills.values().cloned().collect())
    }

    async fn insert_person_skill(
        &self,
        link: NewPersonRoleSkill,
    ) -> RepositoryResult<PersonRoleSkill> {
        let mut t = self.tables.write().await;
        if t.person_skills.values().any(|l| {
            l.person_id == link.person_id && l.role == link.role && l.skill_id == link.skill_id
        }) {
            return Err(RepositoryError::Conflict(format!(
                "skill {} already declared as {}",
                link.skill_id, link.role
            )));
        }

        let id = t.next_id();
        let link = PersonRoleSkill {
            id,
            person_id: link.person_id,
            skill_id: link.skill_id,
            role: link.role,
            created_at: Utc::now(),
        };
        t.person_skills.insert(id, link.clone());
        Ok(link)
    }

    async fn list_person_skills(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<PersonRoleSkill>> {
        let t = self.tables.read().await;
        Ok(t.person_skills
            .values()
            .filter(|l| l.person_id == person_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert_session(
        &self,
        instructor_id: PersonId,
        session: &NewSession,
    ) -> RepositoryResult<LearningSession> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let session = LearningSession {
            id,
            instructor_id,
            skill_id: session.skill_id,
            title: session.title.clone(),
            description: session.description.clone(),
            capacity: session.capacity,
            starts_at: session.starts_at,
            ends_at: session.ends_at,
            status: SessionStatus::Draft,
            created_at: Utc::now(),
        };
        t.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: SessionId) -> RepositoryResult<Option<LearningSession>> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn update_session_status(
        &self,
        id: SessionId,
        status: SessionStatus,
    ) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let session = t
            .sessions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("session", id))?;
        session.status = status;
        Ok(())
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> RepositoryResult<Vec<LearningSession>> {
        let t = self.tables.read().await;
        Ok(t.sessions
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }

    async fn list_sessions_by_instructor(
        &self,
        instructor_id: PersonId,
    ) -> RepositoryResult<Vec<LearningSession>> {
        let t = self.tables.read().await;
        Ok(t.sessions
            .values()
            .filter(|s| s.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        t.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("session", id))
    }

    async fn insert_note(&self, note: NewClassNote) -> RepositoryResult<ClassNote> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let note = ClassNote {
            id,
            session_id: note.session_id,
            author_id: note.author_id,
            content: note.content,
            created_at: Utc::now(),
        };
        t.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn list_notes(&self, session_id: SessionId) -> RepositoryResult<Vec<ClassNote>> {
        let t = self.tables.read().await;
        Ok(t.notes
            .values()
            .filter(|n| n.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn delete_notes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        t.notes.retain(|_, n| n.session_id != session_id);
        Ok(())
    }

    async fn insert_quiz(&self, session_id: SessionId, quiz: &NewQuiz) -> RepositoryResult<Quiz> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let quiz = Quiz {
            id,
            session_id,
            title: quiz.title.clone(),
            questions: quiz.questions.clone(),
            created_at: Utc::now(),
        };
        t.quizzes.insert(id, quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, id: i64) -> RepositoryResult<Option<Quiz>> {
        Ok(self.tables.read().await.quizzes.get(&id).cloned())
    }

    async fn list_quizzes(&self, session_id: SessionId) -> RepositoryResult<Vec<Quiz>> {
        let t = self.tables.read().await;
        Ok(t.quizzes
            .values()
            .filter(|q| q.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn delete_quizzes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        t.quizzes.retain(|_, q| q.session_id != session_id);
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert_booking(&self, booking: NewBooking) -> RepositoryResult<Booking> {
        let mut t = self.tables.write().await;
        if t.bookings.values().any(|b| {
            b.is_active() && b.session_id == booking.session_id && b.learner_id == booking.learner_id
        }) {
            return Err(RepositoryError::Conflict(format!(
                "person {} already booked session {}",
                booking.learner_id, booking.session_id
            )));
        }

        let id = t.next_id();
        let booking = Booking {
            id,
            session_id: booking.session_id,
            learner_id: booking.learner_id,
            status: booking.status,
            credits_charged: booking.credits_charged,
            created_at: Utc::now(),
            cancelled_at: None,
        };
        t.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn find_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(&id).cloned())
    }

    async fn update_booking(&self, booking: &Booking) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let stored = t
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| RepositoryError::not_found("booking", booking.id))?;
        stored.status = booking.status;
        stored.cancelled_at = booking.cancelled_at;
        Ok(())
    }

    async fn list_bookings_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Booking>> {
        let t = self.tables.read().await;
        Ok(t.bookings
            .values()
            .filter(|b| b.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn list_bookings_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Booking>> {
        let t = self.tables.read().await;
        Ok(t.bookings
            .values()
            .filter(|b| b.learner_id == person_id)
            .cloned()
            .collect())
    }

    async fn count_confirmed(&self, session_id: SessionId) -> RepositoryResult<u32> {
        let t = self.tables.read().await;
        let count = t
            .bookings
            .values()
            .filter(|b| b.session_id == session_id && b.status == BookingStatus::Confirmed)
            .count();
        Ok(count as u32)
    }

    async fn delete_bookings_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        t.bookings.retain(|_, b| b.session_id != session_id);
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn insert_exchange(&self, exchange: NewExchange) -> RepositoryResult<Exchange> {
        let mut t = self.tables.write().await;
        if t.exchanges.values().any(|e| e.session_id == exchange.session_id) {
            return Err(RepositoryError::Conflict(format!(
                "session {} already has an exchange",
                exchange.session_id
            )));
        }

        let id = t.next_id();
        let exchange = Exchange {
            id,
            session_id: exchange.session_id,
            exchange_type: exchange.exchange_type,
            credits_cost: exchange.credits_cost,
            created_at: Utc::now(),
        };
        t.exchanges.insert(id, exchange.clone());
        Ok(exchange)
    }

    async fn find_exchange_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Option<Exchange>> {
        let t = self.tables.read().await;
        Ok(t.exchanges
            .values()
            .find(|e| e.session_id == session_id)
            .cloned())
    }

    async fn delete_exchange(&self, id: ExchangeId) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        if t.exchanges.remove(&id).is_none() {
            return Err(RepositoryError::not_found("exchange", id));
        }
        t.transactions.retain(|_, tx| tx.exchange_id != id);
        Ok(())
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> RepositoryResult<Transaction> {
        let mut t = self.tables.write().await;
        if !t.exchanges.contains_key(&tx.exchange_id) {
            return Err(RepositoryError::not_found("exchange", tx.exchange_id));
        }

        let id = t.next_id();
        let tx = Transaction {
            id,
            exchange_id: tx.exchange_id,
            person_id: tx.person_id,
            booking_id: tx.booking_id,
            amount: tx.amount,
            direction: tx.direction,
            created_at: Utc::now(),
        };
        t.transactions.insert(id, tx.clone());
        Ok(tx)
    }

    async fn list_transactions(
        &self,
        exchange_id: ExchangeId,
    ) -> RepositoryResult<Vec<Transaction>> {
        let t = self.tables.read().await;
        Ok(t.transactions
            .values()
            .filter(|tx| tx.exchange_id == exchange_id)
            .cloned()
            .collect())
    }

    async fn insert_credit_package(
        &self,
        package: NewCreditPackage,
    ) -> RepositoryResult<CreditPackage> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let package = CreditPackage {
            id,
            name: package.name,
            credits: package.credits,
            price_cents: package.price_cents,
            active: true,
            created_at: Utc::now(),
        };
        t.credit_packages.insert(id, package.clone());
        Ok(package)
    }

    async fn find_credit_package(&self, id: i64) -> RepositoryResult<Option<CreditPackage>> {
        Ok(self.tables.read().await.credit_packages.get(&id).cloned())
    }

    async fn list_credit_packages(
        &self,
        active_only: bool,
    ) -> RepositoryResult<Vec<CreditPackage>> {
        let t = self.tables.read().await;
        Ok(t.credit_packages
            .values()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommunityRepository for MemoryStore {
    async fn insert_community(&self, community: NewCommunity) -> RepositoryResult<Community> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let community = Community {
            id,
            name: community.name,
            description: community.description,
            created_at: Utc::now(),
        };
        t.communities.insert(id, community.clone());
        Ok(community)
    }

    async fn find_community(&self, id: CommunityId) -> RepositoryResult<Option<Community>> {
        Ok(self.tables.read().await.communities.get(&id).cloned())
    }

    async fn add_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<CommunityMembership> {
        let mut t = self.tables.write().await;
        if !t.communities.contains_key(&community_id) {
            return Err(RepositoryError::not_found("community", community_id));
        }
        if t
            .memberships
            .iter()
            .any(|m| m.community_id == community_id && m.person_id == person_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "person {} is already a member of community {}",
                person_id, community_id
            )));
        }

        let membership = CommunityMembership {
            community_id,
            person_id,
            joined_at: Utc::now(),
        };
        t.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn list_members(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityMembership>> {
        let t = self.tables.read().await;
        Ok(t.memberships
            .iter()
            .filter(|m| m.community_id == community_id)
            .cloned()
            .collect())
    }

    async fn list_communities_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Community>> {
        let t = self.tables.read().await;
        Ok(t.memberships
            .iter()
            .filter(|m| m.person_id == person_id)
            .filter_map(|m| t.communities.get(&m.community_id).cloned())
            .collect())
    }

    async fn is_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<bool> {
        let t = self.tables.read().await;
        Ok(t.memberships
            .iter()
            .any(|m| m.community_id == community_id && m.person_id == person_id))
    }

    async fn insert_credential(&self, credential: NewCredential) -> RepositoryResult<Credential> {
        let mut t = self.tables.write().await;
        if t.credentials.values().any(|c| {
            c.community_id == credential.community_id
                && c.person_id == credential.person_id
                && c.kind == credential.kind
        }) {
            return Err(RepositoryError::Conflict(format!(
                "credential {} already issued",
                credential.kind
            )));
        }

        let id = t.next_id();
        let credential = Credential {
            id,
            community_id: credential.community_id,
            person_id: credential.person_id,
            kind: credential.kind,
            title: credential.kind.title().to_string(),
            issued_at: Utc::now(),
        };
        t.credentials.insert(id, credential.clone());
        Ok(credential)
    }

    async fn list_credentials(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<Credential>> {
        let t = self.tables.read().await;
        Ok(t.credentials
            .values()
            .filter(|c| c.community_id == community_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VerificationRepository for MemoryStore {
    async fn insert_token(
        &self,
        token: NewVerificationToken,
    ) -> RepositoryResult<VerificationToken> {
        let mut t = self.tables.write().await;
        if t.tokens.values().any(|v| v.token == token.token) {
            return Err(RepositoryError::Conflict("token collision".to_string()));
        }

        let id = t.next_id();
        let token = VerificationToken {
            id,
            person_id: token.person_id,
            token: token.token,
            status: TokenStatus::Issued,
            created_at: Utc::now(),
            expires_at: token.expires_at,
            verified_at: None,
        };
        t.tokens.insert(id, token.clone());
        Ok(token)
    }

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<VerificationToken>> {
        let t = self.tables.read().await;
        Ok(t.tokens.values().find(|v| v.token == token).cloned())
    }

    async fn list_tokens_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<VerificationToken>> {
        let t = self.tables.read().await;
        Ok(t.tokens
            .values()
            .filter(|v| v.person_id == person_id)
            .cloned()
            .collect())
    }

    async fn update_token(&self, token: &VerificationToken) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let stored = t
            .tokens
            .get_mut(&token.id)
            .ok_or_else(|| RepositoryError::not_found("verification token", token.id))?;
        stored.status = token.status;
        stored.verified_at = token.verified_at;
        Ok(())
    }
}

#[async_trait]
impl SuggestionRepository for MemoryStore {
    async fn upsert_suggestion(
        &self,
        person_id: PersonId,
        session_id: SessionId,
    ) -> RepositoryResult<SessionSuggestion> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t
            .suggestions
            .values()
            .find(|s| s.person_id == person_id && s.session_id == session_id)
        {
            return Ok(existing.clone());
        }

        let id = t.next_id();
        let suggestion = SessionSuggestion {
            id,
            person_id,
            session_id,
            viewed: false,
            created_at: Utc::now(),
        };
        t.suggestions.insert(id, suggestion.clone());
        Ok(suggestion)
    }

    async fn find_suggestion(&self, id: i64) -> RepositoryResult<Option<SessionSuggestion>> {
        Ok(self.tables.read().await.suggestions.get(&id).cloned())
    }

    async fn list_suggestions(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<SessionSuggestion>> {
        let t = self.tables.read().await;
        Ok(t.suggestions
            .values()
            .filter(|s| s.person_id == person_id)
            .cloned()
            .collect())
    }

    async fn mark_suggestion_viewed(&self, id: i64) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let suggestion = t
            .suggestions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("suggestion", id))?;
        suggestion.viewed = true;
        Ok(())
    }

    async fn delete_suggestions_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        t.suggestions.retain(|_, s| s.session_id != session_id);
        Ok(())
    }
}
