//! Session quizzes

use serde::Deserialize;
use skillswap_core::{NewQuiz, Quiz, QuizResult, QuizView, SessionId};
use skillswap_repository::SessionRepository;
use tracing::info;

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};
use crate::session::{is_confirmed_learner, require_participant};

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<usize>,
}

#[derive(Clone)]
pub struct QuizService {
    ctx: ServiceContext,
}

impl QuizService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create_quiz(
        &self,
        session_id: SessionId,
        identity: &Identity,
        quiz: NewQuiz,
    ) -> Result<Quiz> {
        let instructor = self.ctx.acting_person(identity).await?;
        self.ctx.owned_session(session_id, &instructor).await?;
        quiz.validate()?;

        let quiz = self.ctx.store.insert_quiz(session_id, &quiz).await?;
        info!("Quiz {} added to session {}", quiz.id, session_id);
        Ok(quiz)
    }

    /// Quizzes for a session. Learners get them without the answer key.
    pub async fn list_quizzes(
        &self,
        session_id: SessionId,
        identity: &Identity,
    ) -> Result<Vec<QuizView>> {
        let person = self.ctx.acting_person(identity).await?;
        let session = self.ctx.require_session(session_id).await?;
        require_participant(&self.ctx, &session, &person).await?;

        let with_answers = session.instructor_id == person.id;
        let quizzes = self.ctx.store.list_quizzes(session_id).await?;
        Ok(quizzes.iter().map(|q| q.view(with_answers)).collect())
    }

    /// Grade a confirmed learner's answers
    pub async fn submit(
        &self,
        quiz_id: i64,
        identity: &Identity,
        submission: QuizSubmission,
    ) -> Result<QuizResult> {
        let person = self.ctx.acting_person(identity).await?;
        let quiz = self
            .ctx
            .store
            .find_quiz(quiz_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quiz", quiz_id))?;

        if !is_confirmed_learner(&self.ctx, quiz.session_id, &person).await? {
            return Err(ServiceError::forbidden(format!(
                "quiz {} is only open to confirmed learners",
                quiz_id
            )));
        }

        let result = quiz.grade(&submission.answers)?;
        info!(
            "Person {} scored {}/{} on quiz {}",
            person.id, result.correct, result.total, quiz_id
        );
        Ok(result)
    }
}
