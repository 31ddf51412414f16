//! PostgreSQL database repository implementation
//!
//! Unique constraints and the non-negative balance live in the schema
//! (`migrations/0001_init.sql`); violations surface as
//! [`RepositoryError::Conflict`] and [`RepositoryError::InsufficientCredits`].

use async_trait::async_trait;
use skillswap_core::*;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{debug, info};

use crate::{error::RepositoryError, traits::*, RepositoryResult};

/// PostgreSQL store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL
    ///
    /// # Example
    /// ```no_run
    /// use skillswap_repository::PostgresStore;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let store = PostgresStore::connect("postgresql://localhost/skillswap", 10).await?;
    ///     store.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(database_url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected to PostgreSQL (max_connections={})", max_connections);
        Ok(Self { pool })
    }

    /// Create a store with an existing pool
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Other(format!("migration failed: {}", e)))?;
        Ok(())
    }
}

impl Store for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Map a unique violation to `Conflict`, everything else to `Database`
fn conflict_or(err: sqlx::Error, message: impl FnOnce() -> String) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(message())
        }
        _ => RepositoryError::Database(err),
    }
}

fn to_u32(value: i32, column: &str) -> RepositoryResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Corrupt(format!("negative {}: {}", column, value)))
}

fn person_from_row(row: &PgRow) -> RepositoryResult<Person> {
    let profile: Option<String> = row.try_get("profile")?;
    Ok(Person {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        account_role: row.try_get::<String, _>("account_role")?.parse()?,
        profile: profile.map(|p| p.parse()).transpose()?,
        credits: row.try_get("credits")?,
        email_verified: row.try_get("email_verified")?,
        enabled: row.try_get("enabled")?,
        locked: row.try_get("locked")?,
        created_at: row.try_get("created_at")?,
    })
}

fn area_from_row(row: &PgRow) -> RepositoryResult<KnowledgeArea> {
    Ok(KnowledgeArea {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn skill_from_row(row: &PgRow) -> RepositoryResult<Skill> {
    Ok(Skill {
        id: row.try_get("id")?,
        knowledge_area_id: row.try_get("knowledge_area_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn person_skill_from_row(row: &PgRow) -> RepositoryResult<PersonRoleSkill> {
    Ok(PersonRoleSkill {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        skill_id: row.try_get("skill_id")?,
        role: row.try_get::<String, _>("role")?.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn session_from_row(row: &PgRow) -> RepositoryResult<LearningSession> {
    Ok(LearningSession {
        id: row.try_get("id")?,
        instructor_id: row.try_get("instructor_id")?,
        skill_id: row.try_get("skill_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        capacity: to_u32(row.try_get("capacity")?, "capacity")?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn note_from_row(row: &PgRow) -> RepositoryResult<ClassNote> {
    Ok(ClassNote {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn quiz_from_row(row: &PgRow) -> RepositoryResult<Quiz> {
    let questions: Json<Vec<Question>> = row.try_get("questions")?;
    Ok(Quiz {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        title: row.try_get("title")?,
        questions: questions.0,
        created_at: row.try_get("created_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> RepositoryResult<Booking> {
    Ok(Booking {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        learner_id: row.try_get("learner_id")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        credits_charged: row.try_get("credits_charged")?,
        created_at: row.try_get("created_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
    })
}

fn exchange_from_row(row: &PgRow) -> RepositoryResult<Exchange> {
    Ok(Exchange {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        exchange_type: row.try_get::<String, _>("exchange_type")?.parse()?,
        credits_cost: row.try_get("credits_cost")?,
        created_at: row.try_get("created_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> RepositoryResult<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        exchange_id: row.try_get("exchange_id")?,
        person_id: row.try_get("person_id")?,
        booking_id: row.try_get("booking_id")?,
        amount: row.try_get("amount")?,
        direction: row.try_get::<String, _>("direction")?.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn package_from_row(row: &PgRow) -> RepositoryResult<CreditPackage> {
    Ok(CreditPackage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        credits: row.try_get("credits")?,
        price_cents: row.try_get("price_cents")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn community_from_row(row: &PgRow) -> RepositoryResult<Community> {
    Ok(Community {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn membership_from_row(row: &PgRow) -> RepositoryResult<CommunityMembership> {
    Ok(CommunityMembership {
        community_id: row.try_get("community_id")?,
        person_id: row.try_get("person_id")?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn credential_from_row(row: &PgRow) -> RepositoryResult<Credential> {
    Ok(Credential {
        id: row.try_get("id")?,
        community_id: row.try_get("community_id")?,
        person_id: row.try_get("person_id")?,
        kind: row.try_get::<String, _>("kind")?.parse()?,
        title: row.try_get("title")?,
        issued_at: row.try_get("issued_at")?,
    })
}

fn token_from_row(row: &PgRow) -> RepositoryResult<VerificationToken> {
    Ok(VerificationToken {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        token: row.try_get("token")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        verified_at: row.try_get("verified_at")?,
    })
}

fn suggestion_from_row(row: &PgRow) -> RepositoryResult<SessionSuggestion> {
    Ok(SessionSuggestion {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        session_id: row.try_get("session_id")?,
        viewed: row.try_get("viewed")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect<T>(
    rows: Vec<PgRow>,
    map: fn(&PgRow) -> RepositoryResult<T>,
) -> RepositoryResult<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl PersonRepository for PostgresStore {
    async fn insert_person(&self, person: NewPerson) -> RepositoryResult<Person> {
        let email = person.email.clone();
        let row = sqlx::query(
            r#"
            INSERT INTO people
                (email, display_name, password_hash, account_role, profile, credits, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&person.email)
        .bind(&person.display_name)
        .bind(&person.password_hash)
        .bind(person.account_role.as_str())
        .bind(person.profile.map(|p| p.as_str()))
        .bind(person.credits)
        .bind(person.email_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("email already registered: {}", email)))?;

        person_from_row(&row)
    }

    async fn find_person(&self, id: PersonId) -> RepositoryResult<Option<Person>> {
        let row = sqlx::query("SELECT * FROM people WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn find_person_by_email(&self, email: &str) -> RepositoryResult<Option<Person>> {
        let row = sqlx::query("SELECT * FROM people WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn update_person(&self, person: &Person) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE people
            SET display_name = $2, password_hash = $3, account_role = $4, profile = $5,
                email_verified = $6, enabled = $7, locked = $8
            WHERE id = $1
            "#,
        )
        .bind(person.id)
        .bind(&person.display_name)
        .bind(&person.password_hash)
        .bind(person.account_role.as_str())
        .bind(person.profile.map(|p| p.as_str()))
        .bind(person.email_verified)
        .bind(person.enabled)
        .bind(person.locked)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("person", person.id));
        }
        Ok(())
    }

    async fn adjust_credits(&self, id: PersonId, delta: i64) -> RepositoryResult<i64> {
        let row = sqlx::query(
            r#"
            UPDATE people SET credits = credits + $2
            WHERE id = $1 AND credits + $2 >= 0
            RETURNING credits
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.try_get("credits")?);
        }

        // Distinguish a missing person from a refused debit
        match self.find_person(id).await? {
            Some(person) => Err(RepositoryError::InsufficientCredits {
                person_id: id,
                balance: person.credits,
                requested: -delta,
            }),
            None => Err(RepositoryError::not_found("person", id)),
        }
    }
}

#[async_trait]
impl CatalogRepository for PostgresStore {
    async fn insert_knowledge_area(
        &self,
        area: NewKnowledgeArea,
    ) -> RepositoryResult<KnowledgeArea> {
        let name = area.name.clone();
        let row = sqlx::query(
            "INSERT INTO knowledge_areas (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&area.name)
        .bind(&area.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("knowledge area already exists: {}", name)))?;
        area_from_row(&row)
    }

    async fn find_knowledge_area(
        &self,
        id: KnowledgeAreaId,
    ) -> RepositoryResult<Option<KnowledgeArea>> {
        let row = sqlx::query("SELECT * FROM knowledge_areas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(area_from_row).transpose()
    }

    async fn list_knowledge_areas(&self) -> RepositoryResult<Vec<KnowledgeArea>> {
        let rows = sqlx::query("SELECT * FROM knowledge_areas ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        collect(rows, area_from_row)
    }

    async fn insert_skill(&self, skill: NewSkill) -> RepositoryResult<Skill> {
        let name = skill.name.clone();
        let row = sqlx::query(
            r#"
            INSERT INTO skills (knowledge_area_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(skill.knowledge_area_id)
        .bind(&skill.name)
        .bind(&skill.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("skill already exists in area: {}", name)))?;
        skill_from_row(&row)
    }

    async fn find_skill(&self, id: SkillId) -> RepositoryResult<Option<Skill>> {
        let row = sqlx::query("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(skill_from_row).transpose()
    }

    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>> {
        let rows = sqlx::query("SELECT * FROM skills ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        collect(rows, skill_from_row)
    }

    async fn insert_person_skill(
        &self,
        link: NewPersonRoleSkill,
    ) -> RepositoryResult<PersonRoleSkill> {
        let row = sqlx::query(
            r#"
            INSERT INTO person_role_skills (person_id, skill_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(link.person_id)
        .bind(link.skill_id)
        .bind(link.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or(e, || {
                format!("skill {} already declared as {}", link.skill_id, link.role)
            })
        })?;
        person_skill_from_row(&row)
    }

    async fn list_person_skills(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<PersonRoleSkill>> {
        let rows = sqlx::query("SELECT * FROM person_role_skills WHERE person_id = $1 ORDER BY id")
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, person_skill_from_row)
    }
}

#[async_trait]
impl SessionRepository for PostgresStore {
    async fn insert_session(
        &self,
        instructor_id: PersonId,
        session: &NewSession,
    ) -> RepositoryResult<LearningSession> {
        let capacity = i32::try_from(session.capacity)
            .map_err(|_| RepositoryError::Other(format!("capacity too large: {}", session.capacity)))?;

        let row = sqlx::query(
            r#"
            INSERT INTO learning_sessions
                (instructor_id, skill_id, title, description, capacity, starts_at, ends_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(instructor_id)
        .bind(session.skill_id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(capacity)
        .bind(session.starts_at)
        .bind(session.ends_at)
        .bind(SessionStatus::Draft.as_str())
        .fetch_one(&self.pool)
        .await?;
        session_from_row(&row)
    }

    async fn find_session(&self, id: SessionId) -> RepositoryResult<Option<LearningSession>> {
        let row = sqlx::query("SELECT * FROM learning_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn update_session_status(
        &self,
        id: SessionId,
        status: SessionStatus,
    ) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE learning_sessions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("session", id));
        }
        Ok(())
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> RepositoryResult<Vec<LearningSession>> {
        let rows = sqlx::query("SELECT * FROM learning_sessions WHERE status = $1 ORDER BY id")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        collect(rows, session_from_row)
    }

    async fn list_sessions_by_instructor(
        &self,
        instructor_id: PersonId,
    ) -> RepositoryResult<Vec<LearningSession>> {
        let rows =
            sqlx::query("SELECT * FROM learning_sessions WHERE instructor_id = $1 ORDER BY id")
                .bind(instructor_id)
                .fetch_all(&self.pool)
                .await?;
        collect(rows, session_from_row)
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM learning_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("session", id));
        }
        debug!("Deleted session {}", id);
        Ok(())
    }

    async fn insert_note(&self, note: NewClassNote) -> RepositoryResult<ClassNote> {
        let row = sqlx::query(
            "INSERT INTO class_notes (session_id, author_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(note.session_id)
        .bind(note.author_id)
        .bind(&note.content)
        .fetch_one(&self.pool)
        .await?;
        note_from_row(&row)
    }

    async fn list_notes(&self, session_id: SessionId) -> RepositoryResult<Vec<ClassNote>> {
        let rows = sqlx::query("SELECT * FROM class_notes WHERE session_id = $1 ORDER BY id")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, note_from_row)
    }

    async fn delete_notes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM class_notes WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_quiz(&self, session_id: SessionId, quiz: &NewQuiz) -> RepositoryResult<Quiz> {
        let row = sqlx::query(
            "INSERT INTO quizzes (session_id, title, questions) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(session_id)
        .bind(&quiz.title)
        .bind(Json(&quiz.questions))
        .fetch_one(&self.pool)
        .await?;
        quiz_from_row(&row)
    }

    async fn find_quiz(&self, id: i64) -> RepositoryResult<Option<Quiz>> {
        let row = sqlx::query("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(quiz_from_row).transpose()
    }

    async fn list_quizzes(&self, session_id: SessionId) -> RepositoryResult<Vec<Quiz>> {
        let rows = sqlx::query("SELECT * FROM quizzes WHERE session_id = $1 ORDER BY id")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, quiz_from_row)
    }

    async fn delete_quizzes_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for PostgresStore {
    async fn insert_booking(&self, booking: NewBooking) -> RepositoryResult<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (session_id, learner_id, status, credits_charged)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(booking.session_id)
        .bind(booking.learner_id)
        .bind(booking.status.as_str())
        .bind(booking.credits_charged)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or(e, || {
                format!(
                    "person {} already booked session {}",
                    booking.learner_id, booking.session_id
                )
            })
        })?;
        booking_from_row(&row)
    }

    async fn find_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn update_booking(&self, booking: &Booking) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE bookings SET status = $2, cancelled_at = $3 WHERE id = $1")
                .bind(booking.id)
                .bind(booking.status.as_str())
                .bind(booking.cancelled_at)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("booking", booking.id));
        }
        Ok(())
    }

    async fn list_bookings_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Vec<Booking>> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE session_id = $1 ORDER BY id")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, booking_from_row)
    }

    async fn list_bookings_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Booking>> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE learner_id = $1 ORDER BY id")
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, booking_from_row)
    }

    async fn count_confirmed(&self, session_id: SessionId) -> RepositoryResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE session_id = $1 AND status = $2",
        )
        .bind(session_id)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&self.pool)
        .await?;
        u32::try_from(count).map_err(|_| RepositoryError::Corrupt(format!("count {}", count)))
    }

    async fn delete_bookings_for_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM bookings WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for PostgresStore {
    async fn insert_exchange(&self, exchange: NewExchange) -> RepositoryResult<Exchange> {
        let row = sqlx::query(
            r#"
            INSERT INTO exchanges (session_id, exchange_type, credits_cost)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(exchange.session_id)
        .bind(exchange.exchange_type.as_str())
        .bind(exchange.credits_cost)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or(e, || {
                format!("session {} already has an exchange", exchange.session_id)
            })
        })?;
        exchange_from_row(&row)
    }

    async fn find_exchange_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Option<Exchange>> {
        let row = sqlx::query("SELECT * FROM exchanges WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(exchange_from_row).transpose()
    }

    async fn delete_exchange(&self, id: ExchangeId) -> RepositoryResult<()> {
        // transactions cascade via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM exchanges WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("exchange", id));
        }
        Ok(())
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (exchange_id, person_id, booking_id, amount, direction)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tx.exchange_id)
        .bind(tx.person_id)
        .bind(tx.booking_id)
        .bind(tx.amount)
        .bind(tx.direction.as_str())
        .fetch_one(&self.pool)
        .await?;
        transaction_from_row(&row)
    }

    async fn list_transactions(
        &self,
        exchange_id: ExchangeId,
    ) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query("SELECT * FROM transactions WHERE exchange_id = $1 ORDER BY id")
            .bind(exchange_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, transaction_from_row)
    }

    async fn insert_credit_package(
        &self,
        package: NewCreditPackage,
    ) -> RepositoryResult<CreditPackage> {
        let row = sqlx::query(
            "INSERT INTO credit_packages (name, credits, price_cents) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&package.name)
        .bind(package.credits)
        .bind(package.price_cents)
        .fetch_one(&self.pool)
        .await?;
        package_from_row(&row)
    }

    async fn find_credit_package(&self, id: i64) -> RepositoryResult<Option<CreditPackage>> {
        let row = sqlx::query("SELECT * FROM credit_packages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(package_from_row).transpose()
    }

    async fn list_credit_packages(
        &self,
        active_only: bool,
    ) -> RepositoryResult<Vec<CreditPackage>> {
        let rows =
            sqlx::query("SELECT * FROM credit_packages WHERE active OR NOT $1 ORDER BY id")
                .bind(active_only)
                .fetch_all(&self.pool)
                .await?;
        collect(rows, package_from_row)
    }
}

#[async_trait]
impl CommunityRepository for PostgresStore {
    async fn insert_community(&self, community: NewCommunity) -> RepositoryResult<Community> {
        let row = sqlx::query(
            "INSERT INTO communities (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&community.name)
        .bind(&community.description)
        .fetch_one(&self.pool)
        .await?;
        community_from_row(&row)
    }

    async fn find_community(&self, id: CommunityId) -> RepositoryResult<Option<Community>> {
        let row = sqlx::query("SELECT * FROM communities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(community_from_row).transpose()
    }

    async fn add_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<CommunityMembership> {
        let row = sqlx::query(
            r#"
            INSERT INTO community_memberships (community_id, person_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(community_id)
        .bind(person_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            conflict_or(e, || {
                format!(
                    "person {} is already a member of community {}",
                    person_id, community_id
                )
            })
        })?;
        membership_from_row(&row)
    }

    async fn list_members(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityMembership>> {
        let rows = sqlx::query(
            "SELECT * FROM community_memberships WHERE community_id = $1 ORDER BY joined_at",
        )
        .bind(community_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, membership_from_row)
    }

    async fn list_communities_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<Community>> {
        let rows = sqlx::query(
            r#"
            SELECT c.* FROM communities c
            JOIN community_memberships m ON m.community_id = c.id
            WHERE m.person_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, community_from_row)
    }

    async fn is_member(
        &self,
        community_id: CommunityId,
        person_id: PersonId,
    ) -> RepositoryResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM community_memberships WHERE community_id = $1 AND person_id = $2
            )
            "#,
        )
        .bind(community_id)
        .bind(person_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_credential(&self, credential: NewCredential) -> RepositoryResult<Credential> {
        let row = sqlx::query(
            r#"
            INSERT INTO credentials (community_id, person_id, kind, title)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(credential.community_id)
        .bind(credential.person_id)
        .bind(credential.kind.as_str())
        .bind(credential.kind.title())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || format!("credential {} already issued", credential.kind)))?;
        credential_from_row(&row)
    }

    async fn list_credentials(
        &self,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<Credential>> {
        let rows = sqlx::query("SELECT * FROM credentials WHERE community_id = $1 ORDER BY id")
            .bind(community_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows, credential_from_row)
    }
}

#[async_trait]
impl VerificationRepository for PostgresStore {
    async fn insert_token(
        &self,
        token: NewVerificationToken,
    ) -> RepositoryResult<VerificationToken> {
        let row = sqlx::query(
            r#"
            INSERT INTO verification_tokens (person_id, token, status, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(token.person_id)
        .bind(&token.token)
        .bind(TokenStatus::Issued.as_str())
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, || "token collision".to_string()))?;
        token_from_row(&row)
    }

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<VerificationToken>> {
        let row = sqlx::query("SELECT * FROM verification_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(token_from_row).transpose()
    }

    async fn list_tokens_for_person(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<VerificationToken>> {
        let rows =
            sqlx::query("SELECT * FROM verification_tokens WHERE person_id = $1 ORDER BY id")
                .bind(person_id)
                .fetch_all(&self.pool)
                .await?;
        collect(rows, token_from_row)
    }

    async fn update_token(&self, token: &VerificationToken) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE verification_tokens SET status = $2, verified_at = $3 WHERE id = $1",
        )
        .bind(token.id)
        .bind(token.status.as_str())
        .bind(token.verified_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("verification token", token.id));
        }
        Ok(())
    }
}

#[async_trait]
impl SuggestionRepository for PostgresStore {
    async fn upsert_suggestion(
        &self,
        person_id: PersonId,
        session_id: SessionId,
    ) -> RepositoryResult<SessionSuggestion> {
        // The no-op update makes RETURNING yield the existing row
        let row = sqlx::query(
            r#"
            INSERT INTO session_suggestions (person_id, session_id)
            VALUES ($1, $2)
            ON CONFLICT (person_id, session_id) DO UPDATE SET person_id = EXCLUDED.person_id
            RETURNING *
            "#,
        )
        .bind(person_id)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        suggestion_from_row(&row)
    }

    async fn find_suggestion(&self, id: i64) -> RepositoryResult<Option<SessionSuggestion>> {
        let row = sqlx::query("SELECT * FROM session_suggestions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(suggestion_from_row).transpose()
    }

    async fn list_suggestions(
        &self,
        person_id: PersonId,
    ) -> RepositoryResult<Vec<SessionSuggestion>> {
        let rows =
            sqlx::query("SELECT * FROM session_suggestions WHERE person_id = $1 ORDER BY id")
                .bind(person_id)
                .fetch_all(&self.pool)
                .await?;
        collect(rows, suggestion_from_row)
    }

    async fn mark_suggestion_viewed(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE session_suggestions SET viewed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("suggestion", id));
        }
        Ok(())
    }

    async fn delete_suggestions_for_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM session_suggestions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
