//! Session quizzes

use super::SessionId;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_option: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub session_id: SessionId,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
}

impl Quiz {
    /// Grade submitted option indexes in question order.
    /// Missing answers count as wrong; extra answers are an error.
    pub fn grade(&self, answers: &[usize]) -> Result<QuizResult> {
        if answers.len() > self.questions.len() {
            return Err(CoreError::validation(
                "answers",
                format!(
                    "expected at most {} answers, got {}",
                    self.questions.len(),
                    answers.len()
                ),
            ));
        }

        let correct = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_option == **a)
            .count();

        Ok(QuizResult {
            correct,
            total: self.questions.len(),
        })
    }

    /// Outgoing representation. The answer key is left out unless
    /// `with_answers` is set.
    pub fn view(&self, with_answers: bool) -> QuizView {
        QuizView {
            id: self.id,
            session_id: self.session_id,
            title: self.title.clone(),
            questions: self
                .questions
                .iter()
                .map(|q| QuestionView {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    correct_option: with_answers.then_some(q.correct_option),
                })
                .collect(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
}

/// A quiz as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub id: i64,
    pub session_id: SessionId,
    pub title: String,
    pub questions: Vec<QuestionView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz {
    pub title: String,
    pub questions: Vec<Question>,
}

impl NewQuiz {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title", "must not be blank"));
        }
        if self.questions.is_empty() {
            return Err(CoreError::validation("questions", "at least one question is required"));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.prompt.trim().is_empty() {
                return Err(CoreError::validation(
                    format!("questions[{}].prompt", i),
                    "must not be blank",
                ));
            }
            if q.options.len() < 2 {
                return Err(CoreError::validation(
                    format!("questions[{}].options", i),
                    "at least two options are required",
                ));
            }
            if q.correct_option >= q.options.len() {
                return Err(CoreError::validation(
                    format!("questions[{}].correctOption", i),
                    "out of range",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Quiz {
        Quiz {
            id: 1,
            session_id: 1,
            title: "Ownership".to_string(),
            questions: vec![
                Question {
                    prompt: "Who owns a moved value?".to_string(),
                    options: vec!["caller".to_string(), "callee".to_string()],
                    correct_option: 1,
                },
                Question {
                    prompt: "Can two &mut coexist?".to_string(),
                    options: vec!["yes".to_string(), "no".to_string()],
                    correct_option: 1,
                },
            ],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_grade() {
        let result = quiz().grade(&[1, 0]).unwrap();
        assert_eq!(result, QuizResult { correct: 1, total: 2 });
    }

    #[test]
    fn test_grade_partial_answers() {
        let result = quiz().grade(&[1]).unwrap();
        assert_eq!(result, QuizResult { correct: 1, total: 2 });
        assert!(quiz().grade(&[1, 1, 1]).is_err());
    }

    #[test]
    fn test_view_omits_answer_key() {
        let hidden = serde_json::to_value(quiz().view(false)).unwrap();
        let question = &hidden["questions"][0];
        assert!(question.get("correctOption").is_none());
        assert_eq!(question["options"][1], "callee");

        let full = serde_json::to_value(quiz().view(true)).unwrap();
        assert_eq!(full["questions"][0]["correctOption"], 1);
    }

    #[test]
    fn test_validate_rejects_out_of_range_answer() {
        let new_quiz = NewQuiz {
            title: "t".to_string(),
            questions: vec![Question {
                prompt: "p".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_option: 2,
            }],
        };
        let err = new_quiz.validate().unwrap_err();
        assert!(err.to_string().contains("correctOption"));
    }
}
