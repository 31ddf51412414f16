//! Booking definitions

use super::{BookingId, PersonId, SessionId};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Booking state
    pub enum BookingStatus {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Cancelled => "CANCELLED",
    }
}

/// A learner's reservation against a learning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub session_id: SessionId,
    pub learner_id: PersonId,
    pub status: BookingStatus,

    /// Credits debited when the booking was confirmed
    pub credits_charged: i64,

    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Active bookings hold a seat and count toward the unique constraint
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    /// Move the booking to `CANCELLED`. Fails if it already is.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.status == BookingStatus::Cancelled {
            return Err(CoreError::InvalidTransition {
                entity: "booking",
                from: self.status.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            });
        }
        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(at);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub session_id: SessionId,
    pub learner_id: PersonId,
    pub status: BookingStatus,
    pub credits_charged: i64,
}
