//! SkillSwap services
//!
//! Domain operations over a [`skillswap_repository::Store`]: accounts and
//! email verification, the catalog, session lifecycle, bookings with credit
//! accounting, suggestions, communities and quizzes. Every call that acts on
//! behalf of a user takes an explicit [`Identity`].

pub mod account;
pub mod auth;
pub mod booking;
pub mod builder;
pub mod catalog;
pub mod community;
pub mod config;
mod context;
pub mod credit;
pub mod dev;
pub mod error;
pub mod locks;
pub mod mailer;
pub mod quiz;
pub mod session;
mod skillswap;
pub mod suggestion;
pub mod verification;

// Re-export main types
pub use account::{AccountService, AccountStatus, NewAccount};
pub use auth::{extract_bearer, Identity, IssuedToken, TokenIssuer};
pub use booking::BookingService;
pub use builder::SkillSwapBuilder;
pub use catalog::{CatalogService, DeclareSkill};
pub use community::{CommunityService, CreateCommunity};
pub use config::ServiceConfig;
pub use credit::{CreditService, PurchaseReceipt};
pub use dev::DevService;
pub use error::{Result, ServiceError};
pub use mailer::{LogMailer, MailMessage, Mailer, RecordingMailer};
pub use quiz::{QuizService, QuizSubmission};
pub use session::{SessionService, SessionView};
pub use skillswap::SkillSwap;
pub use suggestion::{SuggestedSession, SuggestionService};
pub use verification::{VerificationOutcome, VerificationService, VerificationStatus};
