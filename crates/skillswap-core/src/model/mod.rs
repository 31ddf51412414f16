//! Entity definitions for SkillSwap
//!
//! Every association is an explicit foreign-key identifier; nothing here
//! loads related records on its own. The modules cover:
//! - People and their role profiles
//! - Knowledge areas, skills and person/skill associations
//! - Learning sessions, class notes and quizzes
//! - Bookings, exchanges and the transaction ledger
//! - Communities and derived credentials
//! - Email verification tokens and session suggestions

/// Declares a fieldless enum stored as an upper-case string.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Storage/wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod booking;
pub mod catalog;
pub mod community;
pub mod exchange;
pub mod person;
pub mod quiz;
pub mod session;
pub mod suggestion;
pub mod verification;

pub type PersonId = i64;
pub type SessionId = i64;
pub type BookingId = i64;
pub type ExchangeId = i64;
pub type SkillId = i64;
pub type KnowledgeAreaId = i64;
pub type CommunityId = i64;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use catalog::{
    KnowledgeArea, NewKnowledgeArea, NewPersonRoleSkill, NewSkill, PersonRoleSkill, Skill,
    SkillRole,
};
pub use community::{
    Community, CommunityMembership, Credential, CredentialKind, NewCommunity, NewCredential,
};
pub use exchange::{
    outstanding_debit, CreditPackage, Exchange, ExchangeType, NewCreditPackage, NewExchange,
    NewTransaction, Transaction, TransactionDirection,
};
pub use person::{AccountRole, NewPerson, Person, RoleProfile};
pub use quiz::{NewQuiz, Question, QuestionView, Quiz, QuizResult, QuizView};
pub use session::{ClassNote, LearningSession, NewClassNote, NewSession, SessionStatus};
pub use suggestion::{overlap_score, SessionSuggestion};
pub use verification::{NewVerificationToken, TokenStatus, VerificationToken};
