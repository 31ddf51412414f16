//! Common test utilities for service integration tests

#![allow(dead_code)]

pub mod faulty;

use chrono::{Duration, Utc};
use skillswap_core::{
    AccountRole, ExchangeType, NewKnowledgeArea, NewPerson, NewSession, NewSkill, RoleProfile,
    Skill, SkillId,
};
use skillswap_repository::{CatalogRepository, PersonRepository, Store};
use skillswap_service::{
    DeclareSkill, Identity, RecordingMailer, ServiceConfig, SessionView, SkillSwap,
    SkillSwapBuilder,
};
use skillswap_core::SkillRole;
use std::sync::Arc;

/// Service facade over a fresh in-memory store
pub struct TestApp {
    pub app: SkillSwap,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: ServiceConfig) -> Self {
        Self::build(SkillSwapBuilder::new().with_config(config)).await
    }

    /// Services over a caller-supplied store
    pub async fn with_store(store: Arc<dyn Store>) -> Self {
        Self::build(SkillSwapBuilder::new().with_config(test_config()).with_store(store)).await
    }

    async fn build(builder: SkillSwapBuilder) -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let app = builder
            .with_mailer(mailer.clone())
            .build()
            .await
            .expect("build services");
        Self { app, mailer }
    }

    /// Insert a verified person directly and return their identity
    pub async fn person(&self, email: &str, profile: Option<RoleProfile>, credits: i64) -> Identity {
        self.app
            .store()
            .insert_person(NewPerson {
                email: email.to_string(),
                display_name: email.to_string(),
                password_hash: String::new(),
                account_role: AccountRole::User,
                profile,
                credits,
                email_verified: true,
            })
            .await
            .expect("insert person");
        Identity::new(email, AccountRole::User)
    }

    pub async fn instructor(&self, email: &str) -> Identity {
        self.person(email, Some(RoleProfile::Instructor), 0).await
    }

    pub async fn learner(&self, email: &str, credits: i64) -> Identity {
        self.person(email, Some(RoleProfile::Learner), credits).await
    }

    pub async fn balance(&self, identity: &Identity) -> i64 {
        self.app
            .store()
            .find_person_by_email(&identity.email)
            .await
            .unwrap()
            .expect("person exists")
            .credits
    }

    /// Create (or reuse) an area and a skill in it
    pub async fn skill(&self, area: &str, name: &str) -> Skill {
        let store = self.app.store();
        let area_id = match store
            .list_knowledge_areas()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.name == area)
        {
            Some(existing) => existing.id,
            None => {
                store
                    .insert_knowledge_area(NewKnowledgeArea {
                        name: area.to_string(),
                        description: None,
                    })
                    .await
                    .unwrap()
                    .id
            }
        };
        store
            .insert_skill(NewSkill {
                knowledge_area_id: area_id,
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn declare(&self, identity: &Identity, skill_id: SkillId, role: SkillRole) {
        self.app
            .catalog()
            .declare_skill(identity, DeclareSkill { skill_id, role })
            .await
            .unwrap();
    }

    /// Create and open a paid session starting `days` from now
    pub async fn open_session(
        &self,
        instructor: &Identity,
        skill_id: SkillId,
        capacity: u32,
        cost: i64,
    ) -> SessionView {
        self.open_session_at(instructor, skill_id, capacity, cost, 1).await
    }

    pub async fn open_session_at(
        &self,
        instructor: &Identity,
        skill_id: SkillId,
        capacity: u32,
        cost: i64,
        days: i64,
    ) -> SessionView {
        let starts_at = Utc::now() + Duration::days(days);
        let exchange_type = if cost > 0 {
            ExchangeType::Paid
        } else {
            ExchangeType::Swap
        };
        let session = self
            .app
            .sessions()
            .create_session(
                instructor,
                NewSession {
                    skill_id,
                    title: format!("Session on skill {}", skill_id),
                    description: None,
                    capacity,
                    starts_at,
                    ends_at: starts_at + Duration::hours(1),
                    exchange_type,
                    credits_cost: cost,
                },
            )
            .await
            .expect("create session");
        self.app
            .sessions()
            .open_session(session.id, instructor)
            .await
            .expect("open session")
    }
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig::new()
        .with_jwt_secret("test-secret")
        .with_bcrypt_cost(4)
        .with_starting_credits(10)
}

/// Pull the token out of a verification link in a mail body
pub fn token_from_body(body: &str) -> Option<String> {
    let start = body.find("token=")? + "token=".len();
    let token: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    Some(token)
}
