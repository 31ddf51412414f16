//! Session lifecycle, class notes and cascade delete

use chrono::{DateTime, Utc};
use serde::Serialize;
use skillswap_core::validation::{require_non_blank, validate_new_session};
use skillswap_core::{
    BookingStatus, ClassNote, ExchangeType, LearningSession, NewClassNote, NewExchange, NewSession,
    Person, PersonId, SessionId, SessionStatus, SkillId,
};
use skillswap_repository::{
    BookingRepository, CatalogRepository, LedgerRepository, SessionRepository,
    SuggestionRepository,
};
use tracing::{info, warn};

use crate::auth::Identity;
use crate::booking::refund_booking;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};

/// Session as returned to clients, with live seat counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub instructor_id: PersonId,
    pub skill_id: SkillId,
    pub title: String,
    pub description: Option<String>,
    pub capacity: u32,
    pub confirmed_count: u32,
    pub available_capacity: u32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Stored status, or `FULL` when an open session has no seats left
    pub status: SessionStatus,
    pub exchange_type: ExchangeType,
    pub credits_cost: i64,
}

#[derive(Clone)]
pub struct SessionService {
    ctx: ServiceContext,
}

impl SessionService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a `DRAFT` session together with its exchange
    pub async fn create_session(
        &self,
        identity: &Identity,
        new_session: NewSession,
    ) -> Result<SessionView> {
        let instructor = self.ctx.acting_person(identity).await?;
        if !instructor.is_instructor() {
            return Err(ServiceError::forbidden("instructor profile required"));
        }
        validate_new_session(&new_session)?;

        let store = &self.ctx.store;
        if store.find_skill(new_session.skill_id).await?.is_none() {
            return Err(ServiceError::not_found("skill", new_session.skill_id));
        }

        let session = store.insert_session(instructor.id, &new_session).await?;
        let exchange = store
            .insert_exchange(NewExchange {
                session_id: session.id,
                exchange_type: new_session.exchange_type,
                credits_cost: new_session.credits_cost,
            })
            .await;
        if let Err(e) = exchange {
            warn!("Exchange for session {} failed, removing session: {}", session.id, e);
            store.delete_session(session.id).await?;
            return Err(e.into());
        }

        info!(
            "Session {} created by instructor {} ({} seats)",
            session.id, instructor.id, session.capacity
        );
        build_view(&self.ctx, session).await
    }

    pub async fn get_session(&self, id: SessionId) -> Result<SessionView> {
        let session = self.ctx.require_session(id).await?;
        build_view(&self.ctx, session).await
    }

    /// Open sessions, soonest first
    pub async fn list_open_sessions(&self) -> Result<Vec<SessionView>> {
        let mut sessions = self
            .ctx
            .store
            .list_sessions_by_status(SessionStatus::Open)
            .await?;
        sessions.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));

        let mut views = Vec::with_capacity(sessions.len());
        for session in sessions {
            views.push(build_view(&self.ctx, session).await?);
        }
        Ok(views)
    }

    pub async fn open_session(&self, id: SessionId, identity: &Identity) -> Result<SessionView> {
        self.transition(id, identity, SessionStatus::Open).await
    }

    pub async fn close_session(&self, id: SessionId, identity: &Identity) -> Result<SessionView> {
        self.transition(id, identity, SessionStatus::Closed).await
    }

    pub async fn complete_session(&self, id: SessionId, identity: &Identity) -> Result<SessionView> {
        self.transition(id, identity, SessionStatus::Completed).await
    }

    /// Cancel the session and every active booking, refunding each learner
    pub async fn cancel_session(&self, id: SessionId, identity: &Identity) -> Result<SessionView> {
        self.transition(id, identity, SessionStatus::Cancelled).await
    }

    async fn transition(
        &self,
        id: SessionId,
        identity: &Identity,
        next: SessionStatus,
    ) -> Result<SessionView> {
        let instructor = self.ctx.acting_person(identity).await?;
        let _guard = self.ctx.locks.acquire(id).await;
        let mut session = self.ctx.owned_session(id, &instructor).await?;

        let from = session.status;
        session.transition(next)?;

        if next == SessionStatus::Cancelled {
            // bookings first, so a failed refund leaves the session cancellable
            let cancelled = self.cancel_bookings(id).await?;
            self.ctx.store.update_session_status(id, next).await?;
            info!("Session {} cancelled, {} bookings cancelled", id, cancelled);
        } else {
            self.ctx.store.update_session_status(id, next).await?;
            info!("Session {} moved from {} to {}", id, from, next);
        }

        build_view(&self.ctx, session).await
    }

    async fn cancel_bookings(&self, id: SessionId) -> Result<usize> {
        let store = &self.ctx.store;
        let now = Utc::now();
        let mut cancelled = 0;
        for mut booking in store.list_bookings_for_session(id).await? {
            if !booking.is_active() {
                continue;
            }
            refund_booking(&self.ctx, &booking).await?;
            booking.cancel(now)?;
            store.update_booking(&booking).await?;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    /// Delete a session and everything attached to it.
    ///
    /// Active bookings are refunded first.
    pub async fn delete_session(&self, id: SessionId, identity: &Identity) -> Result<()> {
        let instructor = self.ctx.acting_person(identity).await?;
        let _guard = self.ctx.locks.acquire(id).await;
        self.ctx.owned_session(id, &instructor).await?;

        self.cancel_bookings(id).await?;

        let store = &self.ctx.store;
        if let Some(exchange) = store.find_exchange_for_session(id).await? {
            store.delete_exchange(exchange.id).await?;
        }
        store.delete_bookings_for_session(id).await?;
        store.delete_suggestions_for_session(id).await?;
        store.delete_notes_for_session(id).await?;
        store.delete_quizzes_for_session(id).await?;
        store.delete_session(id).await?;

        info!("Session {} deleted by instructor {}", id, instructor.id);
        Ok(())
    }

    /// Attach a note to a session (instructor only)
    pub async fn add_note(
        &self,
        id: SessionId,
        identity: &Identity,
        content: String,
    ) -> Result<ClassNote> {
        let instructor = self.ctx.acting_person(identity).await?;
        self.ctx.owned_session(id, &instructor).await?;
        require_non_blank("content", &content)?;

        let note = self
            .ctx
            .store
            .insert_note(NewClassNote {
                session_id: id,
                author_id: instructor.id,
                content,
            })
            .await?;
        Ok(note)
    }

    /// Notes for the instructor or a confirmed learner
    pub async fn list_notes(&self, id: SessionId, identity: &Identity) -> Result<Vec<ClassNote>> {
        let person = self.ctx.acting_person(identity).await?;
        let session = self.ctx.require_session(id).await?;
        require_participant(&self.ctx, &session, &person).await?;
        Ok(self.ctx.store.list_notes(id).await?)
    }
}

/// Attach live seat counts and exchange terms to a session
pub(crate) async fn build_view(ctx: &ServiceContext, session: LearningSession) -> Result<SessionView> {
    let store = &ctx.store;
    let confirmed = store.count_confirmed(session.id).await?;
    let exchange = store.find_exchange_for_session(session.id).await?;

    Ok(SessionView {
        id: session.id,
        instructor_id: session.instructor_id,
        skill_id: session.skill_id,
        confirmed_count: confirmed,
        available_capacity: session.available_capacity(confirmed),
        status: session.effective_status(confirmed),
        capacity: session.capacity,
        starts_at: session.starts_at,
        ends_at: session.ends_at,
        exchange_type: exchange.as_ref().map_or(ExchangeType::Swap, |e| e.exchange_type),
        credits_cost: exchange.as_ref().map_or(0, |e| e.credits_cost),
        title: session.title,
        description: session.description,
    })
}

/// Whether `person` holds a confirmed booking for `session_id`
pub(crate) async fn is_confirmed_learner(
    ctx: &ServiceContext,
    session_id: SessionId,
    person: &Person,
) -> Result<bool> {
    Ok(ctx
        .store
        .list_bookings_for_session(session_id)
        .await?
        .iter()
        .any(|b| b.learner_id == person.id && b.status == BookingStatus::Confirmed))
}

/// Fail with `Authorization` unless `person` teaches or attends the session
pub(crate) async fn require_participant(
    ctx: &ServiceContext,
    session: &LearningSession,
    person: &Person,
) -> Result<()> {
    if session.instructor_id == person.id
        || is_confirmed_learner(ctx, session.id, person).await?
    {
        return Ok(());
    }
    Err(ServiceError::forbidden(format!(
        "not a participant of session {}",
        session.id
    )))
}
