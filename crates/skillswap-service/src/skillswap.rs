//! Service facade

use skillswap_repository::Store;
use std::sync::Arc;

use crate::account::AccountService;
use crate::booking::BookingService;
use crate::catalog::CatalogService;
use crate::community::CommunityService;
use crate::config::ServiceConfig;
use crate::context::ServiceContext;
use crate::credit::CreditService;
use crate::dev::DevService;
use crate::quiz::QuizService;
use crate::session::SessionService;
use crate::suggestion::SuggestionService;
use crate::verification::VerificationService;

/// All SkillSwap services over one store. Cheap to clone.
#[derive(Clone)]
pub struct SkillSwap {
    ctx: ServiceContext,
    accounts: AccountService,
    bookings: BookingService,
    catalog: CatalogService,
    communities: CommunityService,
    credits: CreditService,
    dev: DevService,
    quizzes: QuizService,
    sessions: SessionService,
    suggestions: SuggestionService,
    verification: VerificationService,
}

impl SkillSwap {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        let verification = VerificationService::new(ctx.clone());
        Self {
            accounts: AccountService::new(ctx.clone(), verification.clone()),
            bookings: BookingService::new(ctx.clone()),
            catalog: CatalogService::new(ctx.clone()),
            communities: CommunityService::new(ctx.clone()),
            credits: CreditService::new(ctx.clone()),
            dev: DevService::new(ctx.clone()),
            quizzes: QuizService::new(ctx.clone()),
            sessions: SessionService::new(ctx.clone()),
            suggestions: SuggestionService::new(ctx.clone()),
            verification,
            ctx,
        }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn communities(&self) -> &CommunityService {
        &self.communities
    }

    pub fn credits(&self) -> &CreditService {
        &self.credits
    }

    pub fn dev(&self) -> &DevService {
        &self.dev
    }

    pub fn quizzes(&self) -> &QuizService {
        &self.quizzes
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn suggestions(&self) -> &SuggestionService {
        &self.suggestions
    }

    pub fn verification(&self) -> &VerificationService {
        &self.verification
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.ctx.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.ctx.config
    }
}
