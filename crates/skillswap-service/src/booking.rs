//! Booking service
//!
//! Creation and cancellation run under the session's lock. Seats are counted
//! from live `CONFIRMED` bookings on every call and never cached.

use chrono::Utc;
use skillswap_core::{
    outstanding_debit, Booking, BookingId, BookingStatus, NewBooking, NewTransaction, PersonId,
    SessionId, SessionStatus, TransactionDirection,
};
use skillswap_repository::{BookingRepository, LedgerRepository, PersonRepository};
use tracing::{error, info};

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};

#[derive(Clone)]
pub struct BookingService {
    ctx: ServiceContext,
}

impl BookingService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Book one seat in an open session for the caller.
    ///
    /// Paid sessions debit the learner's balance and record a `DEBIT`
    /// transaction against the session's exchange.
    pub async fn create_individual_booking(
        &self,
        session_id: SessionId,
        identity: &Identity,
    ) -> Result<Booking> {
        let store = &self.ctx.store;
        let learner = self.ctx.acting_person(identity).await?;

        let _guard = self.ctx.locks.acquire(session_id).await;
        let session = self.ctx.require_session(session_id).await?;

        if session.instructor_id == learner.id {
            return Err(ServiceError::invalid_state(
                "instructors cannot book their own session",
            ));
        }
        if session.status != SessionStatus::Open {
            return Err(ServiceError::invalid_state(format!(
                "session {} is not open for booking",
                session_id
            )));
        }

        let already_booked = store
            .list_bookings_for_session(session_id)
            .await?
            .iter()
            .any(|b| b.learner_id == learner.id && b.is_active());
        if already_booked {
            return Err(ServiceError::invalid_state(format!(
                "already booked session {}",
                session_id
            )));
        }

        let confirmed = store.count_confirmed(session_id).await?;
        if session.available_capacity(confirmed) == 0 {
            return Err(ServiceError::invalid_state("no available capacity"));
        }

        let exchange = store
            .find_exchange_for_session(session_id)
            .await?
            .filter(|e| e.is_credit_bearing());
        let cost = exchange.as_ref().map_or(0, |e| e.credits_cost);

        if cost > 0 {
            store.adjust_credits(learner.id, -cost).await?;
        }

        let booking = match store
            .insert_booking(NewBooking {
                session_id,
                learner_id: learner.id,
                status: BookingStatus::Confirmed,
                credits_charged: cost,
            })
            .await
        {
            Ok(booking) => booking,
            Err(e) => {
                restore_credits(&self.ctx, learner.id, cost).await;
                return Err(e.into());
            }
        };

        if let Some(exchange) = exchange {
            let debit = store
                .insert_transaction(NewTransaction {
                    exchange_id: exchange.id,
                    person_id: learner.id,
                    booking_id: Some(booking.id),
                    amount: cost,
                    direction: TransactionDirection::Debit,
                })
                .await;
            if let Err(e) = debit {
                // without its DEBIT entry the booking could never be refunded
                let mut orphan = booking;
                if orphan.cancel(Utc::now()).is_ok() {
                    if let Err(undo_err) = store.update_booking(&orphan).await {
                        error!("Failed to void booking {}: {}", orphan.id, undo_err);
                    }
                }
                restore_credits(&self.ctx, learner.id, cost).await;
                return Err(e.into());
            }
        }

        info!(
            "Booking {} confirmed: person {} in session {} ({} credits)",
            booking.id, learner.id, session_id, cost
        );
        Ok(booking)
    }

    /// Cancel one of the caller's bookings and refund what it was charged.
    ///
    /// A second cancel fails with `InvalidState`, so credits come back once.
    pub async fn cancel_booking(&self, booking_id: BookingId, identity: &Identity) -> Result<Booking> {
        let person = self.ctx.acting_person(identity).await?;
        let booking = self.require_booking(booking_id).await?;
        if booking.learner_id != person.id {
            return Err(ServiceError::forbidden(format!(
                "booking {} belongs to another person",
                booking_id
            )));
        }

        let _guard = self.ctx.locks.acquire(booking.session_id).await;
        // reload under the lock
        let mut booking = self.require_booking(booking_id).await?;
        if !booking.is_active() {
            return Err(ServiceError::invalid_state(format!(
                "booking {} is already cancelled",
                booking_id
            )));
        }

        let session = self.ctx.require_session(booking.session_id).await?;
        if session.status == SessionStatus::Completed {
            return Err(ServiceError::invalid_state(format!(
                "session {} is already completed",
                session.id
            )));
        }

        // refund before the status change; the ledger makes a retry pay nothing twice
        let refunded = refund_booking(&self.ctx, &booking).await?;
        booking.cancel(Utc::now())?;
        self.ctx.store.update_booking(&booking).await?;

        info!(
            "Booking {} cancelled by person {} ({} credits refunded)",
            booking_id, person.id, refunded
        );
        Ok(booking)
    }

    /// The caller's bookings, newest first
    pub async fn list_bookings(&self, identity: &Identity) -> Result<Vec<Booking>> {
        let person = self.ctx.acting_person(identity).await?;
        let mut bookings = self.ctx.store.list_bookings_for_person(person.id).await?;
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bookings)
    }

    async fn require_booking(&self, id: BookingId) -> Result<Booking> {
        self.ctx
            .store
            .find_booking(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("booking", id))
    }
}

/// Credit back whatever is still debited for `booking` according to the
/// ledger. Returns the refunded amount.
pub(crate) async fn refund_booking(ctx: &ServiceContext, booking: &Booking) -> Result<i64> {
    let store = &ctx.store;
    let Some(exchange) = store.find_exchange_for_session(booking.session_id).await? else {
        return Ok(0);
    };

    let ledger = store.list_transactions(exchange.id).await?;
    let amount = outstanding_debit(&ledger, booking.id);
    if amount == 0 {
        return Ok(0);
    }

    store.adjust_credits(booking.learner_id, amount).await?;
    let credit = store
        .insert_transaction(NewTransaction {
            exchange_id: exchange.id,
            person_id: booking.learner_id,
            booking_id: Some(booking.id),
            amount,
            direction: TransactionDirection::Credit,
        })
        .await;
    if let Err(e) = credit {
        // the ledger still shows the debit, so take the credits back
        if let Err(undo_err) = store.adjust_credits(booking.learner_id, -amount).await {
            error!(
                "Failed to reverse refund of {} credits for booking {}: {}",
                amount, booking.id, undo_err
            );
        }
        return Err(e.into());
    }
    Ok(amount)
}

/// Give back a debit whose booking could not be recorded
async fn restore_credits(ctx: &ServiceContext, person_id: PersonId, amount: i64) {
    if amount == 0 {
        return;
    }
    if let Err(e) = ctx.store.adjust_credits(person_id, amount).await {
        error!(
            "Failed to restore {} credits to person {}: {}",
            amount, person_id, e
        );
    }
}
