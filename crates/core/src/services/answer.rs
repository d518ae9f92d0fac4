//! Answer service.

use std::sync::LazyLock;

use polling_common::{AppError, AppResult};
use polling_db::{
    entities::{QuestionType, answer},
    repositories::{AnswerRepository, QuestionRepository},
};
use regex::Regex;
use sea_orm::Set;
use tracing::info;
use validator::Validate;

#[allow(clippy::expect_used)]
static SINGLE_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("single option pattern"));

#[allow(clippy::expect_used)]
static MULTIPLE_OPTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\s+)*\d\s*$").expect("multiple options pattern"));

/// Which answers a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerScope {
    /// Every answer.
    All,
    /// Answers of one user. `None` means the caller named no user and sees nothing.
    User(Option<i64>),
}

impl AnswerScope {
    /// Scope for a caller with the given admin flag and claimed user id.
    #[must_use]
    pub const fn new(is_admin: bool, user_id: Option<i64>) -> Self {
        if is_admin {
            Self::All
        } else {
            Self::User(user_id)
        }
    }
}

/// Full answer representation accepted on create and update.
#[derive(Debug, Clone, Validate)]
pub struct AnswerInput {
    pub user_id: i64,
    pub question_id: i64,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub answer: String,
}

impl AnswerInput {
    /// The same input with surrounding whitespace removed from the answer.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            answer: self.answer.trim().to_string(),
            ..self
        }
    }
}

/// Check that `answer` has the shape `question_type` expects.
pub fn check_format(question_type: QuestionType, answer: &str) -> AppResult<()> {
    match question_type {
        QuestionType::Text if answer.trim().is_empty() => Err(AppError::field(
            "answer",
            "This field may not be blank.",
        )),
        QuestionType::SingleOption if !SINGLE_OPTION_RE.is_match(answer) => {
            Err(AppError::Validation(
                "Answer for a single option question has to be a single digit".to_string(),
            ))
        }
        QuestionType::MultipleOptions if !MULTIPLE_OPTIONS_RE.is_match(answer) => {
            Err(AppError::Validation(
                "Answer for a multiple options question has to be digits separated by whitespace"
                    .to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Answer service for business logic.
#[derive(Clone)]
pub struct AnswerService {
    answer_repo: AnswerRepository,
    question_repo: QuestionRepository,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(answer_repo: AnswerRepository, question_repo: QuestionRepository) -> Self {
        Self {
            answer_repo,
            question_repo,
        }
    }

    /// List the answers inside `scope`.
    pub async fn list(&self, scope: AnswerScope) -> AppResult<Vec<answer::Model>> {
        match scope {
            AnswerScope::All => self.answer_repo.find_all().await,
            AnswerScope::User(Some(user_id)) => self.answer_repo.find_by_user(user_id).await,
            AnswerScope::User(None) => Ok(vec![]),
        }
    }

    /// Get one answer. Answers outside `scope` are reported as missing.
    pub async fn get(&self, id: i64, scope: AnswerScope) -> AppResult<answer::Model> {
        let found = match scope {
            AnswerScope::All => self.answer_repo.find_by_id(id).await?,
            AnswerScope::User(Some(user_id)) => {
                self.answer_repo.find_by_id_and_user(id, user_id).await?
            }
            AnswerScope::User(None) => None,
        };
        found.ok_or_else(|| AppError::NotFound(format!("answer {id}")))
    }

    /// Record an answer.
    pub async fn create(&self, input: AnswerInput) -> AppResult<answer::Model> {
        let input = input.trimmed();
        input.validate()?;
        self.check_against_question(&input).await?;

        let model = answer::ActiveModel {
            user_id: Set(input.user_id),
            question_id: Set(input.question_id),
            answer: Set(input.answer),
            ..Default::default()
        };

        let created = self.answer_repo.create(model).await?;
        info!(
            answer_id = created.id,
            question_id = created.question_id,
            user_id = created.user_id,
            "Answer created"
        );
        Ok(created)
    }

    /// Replace an answer visible inside `scope`, re-checking its format.
    pub async fn update(
        &self,
        id: i64,
        scope: AnswerScope,
        input: AnswerInput,
    ) -> AppResult<answer::Model> {
        let existing = self.get(id, scope).await?;

        let input = input.trimmed();
        input.validate()?;
        self.check_against_question(&input).await?;

        let mut active: answer::ActiveModel = existing.into();
        active.user_id = Set(input.user_id);
        active.question_id = Set(input.question_id);
        active.answer = Set(input.answer);

        let updated = self.answer_repo.update(active).await?;
        info!(answer_id = updated.id, "Answer updated");
        Ok(updated)
    }

    /// Delete an answer.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.answer_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("answer {id}")));
        }
        info!(answer_id = id, "Answer deleted");
        Ok(())
    }

    async fn check_against_question(&self, input: &AnswerInput) -> AppResult<()> {
        let question = self
            .question_repo
            .find_by_id(input.question_id)
            .await?
            .ok_or_else(|| {
                AppError::field(
                    "question",
                    format!(
                        "Invalid pk \"{}\" - object does not exist.",
                        input.question_id
                    ),
                )
            })?;

        check_format(question.question_type, &input.answer)
    }
}
