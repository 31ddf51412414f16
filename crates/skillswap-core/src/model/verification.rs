//! Email verification tokens
//!
//! Stored states are `ISSUED`, `VERIFIED` and `USED`. `EXPIRED` is derived
//! from `expires_at` and never written, so an expired token is left exactly
//! as it was.

use super::PersonId;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Verification token state
    pub enum TokenStatus {
        Issued => "ISSUED",
        Verified => "VERIFIED",
        /// Derived only, never persisted
        Expired => "EXPIRED",
        /// Superseded by a newer token
        Used => "USED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationToken {
    pub id: i64,
    pub person_id: PersonId,
    pub token: String,
    pub status: TokenStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationToken {
    /// State as of `now`, with `EXPIRED` derived for stale issued tokens
    pub fn effective_status(&self, now: DateTime<Utc>) -> TokenStatus {
        match self.status {
            TokenStatus::Issued if now >= self.expires_at => TokenStatus::Expired,
            status => status,
        }
    }

    /// ISSUED -> VERIFIED. Any other effective state is returned untouched.
    pub fn verify(&mut self, now: DateTime<Utc>) -> std::result::Result<(), TokenStatus> {
        match self.effective_status(now) {
            TokenStatus::Issued => {
                self.status = TokenStatus::Verified;
                self.verified_at = Some(now);
                Ok(())
            }
            other => Err(other),
        }
    }

    /// ISSUED -> USED, for tokens superseded by a resend
    pub fn invalidate(&mut self) -> Result<()> {
        if self.status != TokenStatus::Issued {
            return Err(CoreError::InvalidTransition {
                entity: "verification token",
                from: self.status.to_string(),
                to: TokenStatus::Used.to_string(),
            });
        }
        self.status = TokenStatus::Used;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewVerificationToken {
    pub person_id: PersonId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
