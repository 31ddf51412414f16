//! Person (account identity) definitions

use super::PersonId;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Account-level role used for administrative checks
    pub enum AccountRole {
        User => "USER",
        Admin => "ADMIN",
    }
}

string_enum! {
    /// Role profile a person may own (zero or one)
    pub enum RoleProfile {
        Learner => "LEARNER",
        Instructor => "INSTRUCTOR",
    }
}

/// Account identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,

    /// Unique login email
    pub email: String,

    pub display_name: String,

    /// bcrypt hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub account_role: AccountRole,

    /// Optional Learner/Instructor profile
    pub profile: Option<RoleProfile>,

    /// Credit balance, never negative
    pub credits: i64,

    pub email_verified: bool,
    pub enabled: bool,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn is_admin(&self) -> bool {
        self.account_role == AccountRole::Admin
    }

    pub fn is_instructor(&self) -> bool {
        self.profile == Some(RoleProfile::Instructor)
    }

    /// Check that the account may authenticate.
    ///
    /// Returns the reason as a validation error on the `account` field so the
    /// caller can surface it as an authorization failure.
    pub fn ensure_active(&self) -> Result<()> {
        if self.locked {
            return Err(CoreError::validation("account", "account is locked"));
        }
        if !self.enabled {
            return Err(CoreError::validation("account", "account is disabled"));
        }
        if !self.email_verified {
            return Err(CoreError::validation("account", "email address is not verified"));
        }
        Ok(())
    }
}

/// Insert payload for a person
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub account_role: AccountRole,
    pub profile: Option<RoleProfile>,
    pub credits: i64,
    pub email_verified: bool,
}
