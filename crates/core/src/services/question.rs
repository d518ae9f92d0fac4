//! Question service.

use polling_common::{AppError, AppResult};
use polling_db::{
    entities::{QuestionType, question},
    repositories::{PollRepository, QuestionRepository},
};
use sea_orm::Set;
use tracing::info;
use validator::Validate;

/// Full question representation accepted on create and update.
#[derive(Debug, Clone, Validate)]
pub struct QuestionInput {
    pub poll_id: i64,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub text: String,
    pub question_type: QuestionType,
}

impl QuestionInput {
    /// The same input with surrounding whitespace removed from the text.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
            ..self
        }
    }
}

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    poll_repo: PollRepository,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, poll_repo: PollRepository) -> Self {
        Self {
            question_repo,
            poll_repo,
        }
    }

    /// List questions, optionally only those of one poll.
    pub async fn list(&self, poll_id: Option<i64>) -> AppResult<Vec<question::Model>> {
        self.question_repo.find_all(poll_id).await
    }

    /// Get a question by ID.
    pub async fn get(&self, id: i64) -> AppResult<question::Model> {
        self.question_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("question {id}")))
    }

    /// Create a question under an existing poll.
    pub async fn create(&self, input: QuestionInput) -> AppResult<question::Model> {
        let input = input.trimmed();
        input.validate()?;
        self.ensure_poll_exists(input.poll_id).await?;

        let model = question::ActiveModel {
            poll_id: Set(input.poll_id),
            text: Set(input.text),
            question_type: Set(input.question_type),
            ..Default::default()
        };

        let created = self.question_repo.create(model).await?;
        info!(
            question_id = created.id,
            poll_id = created.poll_id,
            "Question created"
        );
        Ok(created)
    }

    /// Replace a question.
    pub async fn update(&self, id: i64, input: QuestionInput) -> AppResult<question::Model> {
        let existing = self.get(id).await?;

        let input = input.trimmed();
        input.validate()?;
        if input.poll_id != existing.poll_id {
            self.ensure_poll_exists(input.poll_id).await?;
        }

        let mut active: question::ActiveModel = existing.into();
        active.poll_id = Set(input.poll_id);
        active.text = Set(input.text);
        active.question_type = Set(input.question_type);

        let updated = self.question_repo.update(active).await?;
        info!(question_id = updated.id, "Question updated");
        Ok(updated)
    }

    /// Delete a question along with its answers.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.question_repo.delete_cascade(id).await? {
            return Err(AppError::NotFound(format!("question {id}")));
        }
        info!(question_id = id, "Question deleted");
        Ok(())
    }

    async fn ensure_poll_exists(&self, poll_id: i64) -> AppResult<()> {
        if self.poll_repo.find_by_id(poll_id).await?.is_none() {
            return Err(AppError::field(
                "poll",
                format!("Invalid pk \"{poll_id}\" - object does not exist."),
            ));
        }
        Ok(())
    }
}
