//! Poll service.

use chrono::NaiveDate;
use polling_common::{AppError, AppResult};
use polling_db::{entities::poll, repositories::PollRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Which polls a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every poll, regardless of its window.
    Admin,
    /// Only polls whose window contains today.
    Public,
}

impl Audience {
    /// Audience for a caller with the given admin flag.
    #[must_use]
    pub const fn for_admin(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Public }
    }
}

/// Full poll representation accepted on create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollInput {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Ensure this field has between 1 and 120 characters."
    ))]
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl PollInput {
    /// The same input with surrounding whitespace removed from text fields.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }

    fn check_window(&self) -> AppResult<()> {
        if self.start_date >= self.end_date {
            return Err(AppError::Validation(
                "Start date must be earlier than end date".to_string(),
            ));
        }
        Ok(())
    }
}

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository) -> Self {
        Self { poll_repo }
    }

    /// List the polls visible to `audience` on `today`.
    pub async fn list(&self, audience: Audience, today: NaiveDate) -> AppResult<Vec<poll::Model>> {
        match audience {
            Audience::Admin => self.poll_repo.find_all().await,
            Audience::Public => self.poll_repo.find_active(today).await,
        }
    }

    /// Get one poll. Polls outside the audience's view are reported as missing.
    pub async fn get(
        &self,
        id: i64,
        audience: Audience,
        today: NaiveDate,
    ) -> AppResult<poll::Model> {
        let found = match audience {
            Audience::Admin => self.poll_repo.find_by_id(id).await?,
            Audience::Public => self.poll_repo.find_active_by_id(id, today).await?,
        };
        found.ok_or_else(|| AppError::NotFound(format!("poll {id}")))
    }

    /// Create a poll.
    pub async fn create(&self, input: PollInput) -> AppResult<poll::Model> {
        let input = input.trimmed();
        input.validate()?;
        input.check_window()?;
        self.ensure_title_free(&input.title, None).await?;

        let model = poll::ActiveModel {
            title: Set(input.title),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            description: Set(input.description),
            ..Default::default()
        };

        let created = self.poll_repo.create(model).await?;
        info!(poll_id = created.id, title = %created.title, "Poll created");
        Ok(created)
    }

    /// Replace a poll. The start date is fixed once the poll exists.
    pub async fn update(&self, id: i64, input: PollInput) -> AppResult<poll::Model> {
        let existing = self
            .poll_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("poll {id}")))?;

        let input = input.trimmed();
        input.validate()?;
        input.check_window()?;
        if input.start_date != existing.start_date {
            return Err(AppError::field("start_date", "Start date cannot be changed."));
        }
        self.ensure_title_free(&input.title, Some(id)).await?;

        let mut active: poll::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.end_date = Set(input.end_date);
        active.description = Set(input.description);

        let updated = self.poll_repo.update(active).await?;
        info!(poll_id = updated.id, "Poll updated");
        Ok(updated)
    }

    /// Delete a poll along with its questions and answers.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.poll_repo.delete_cascade(id).await? {
            return Err(AppError::NotFound(format!("poll {id}")));
        }
        info!(poll_id = id, "Poll deleted");
        Ok(())
    }

    async fn ensure_title_free(&self, title: &str, own_id: Option<i64>) -> AppResult<()> {
        match self.poll_repo.find_by_title(title).await? {
            Some(other) if Some(other.id) != own_id => Err(AppError::field(
                "title",
                "poll with this title already exists.",
            )),
            _ => Ok(()),
        }
    }
}
