//! Poll repository.

use std::sync::Arc;

use crate::entities::{Answer, Poll, Question, answer, poll, question};
use polling_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait, prelude::Date, sea_query::Query,
};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a poll by ID, but only while `today` is inside its window.
    pub async fn find_active_by_id(
        &self,
        id: i64,
        today: Date,
    ) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .filter(poll::Column::StartDate.lte(today))
            .filter(poll::Column::EndDate.gte(today))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a poll by its exact title.
    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::Title.eq(title))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All polls, in insertion order.
    pub async fn find_all(&self) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .order_by_asc(poll::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Polls whose window `[start_date, end_date]` contains `today`.
    pub async fn find_active(&self, today: Date) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::StartDate.lte(today))
            .filter(poll::Column::EndDate.gte(today))
            .order_by_asc(poll::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Delete a poll together with its questions and their answers.
    ///
    /// Runs answers → questions → poll in one transaction. Returns `false`
    /// when no poll with this ID existed.
    pub async fn delete_cascade(&self, id: i64) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question_ids = Query::select()
            .column(question::Column::Id)
            .from(question::Entity)
            .and_where(question::Column::PollId.eq(id))
            .to_owned();

        Answer::delete_many()
            .filter(answer::Column::QuestionId.in_subquery(question_ids))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Question::delete_many()
            .filter(question::Column::PollId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Poll::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Unique title collisions surface as validation errors.
fn map_write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::field("title", "poll with this title already exists.")
        }
        _ => AppError::Database(e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_poll(id: i64, title: &str) -> poll::Model {
        poll::Model {
            id,
            title: title.to_string(),
            start_date: date(2020, 1, 1),
            end_date: date(2020, 2, 1),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_poll() {
        let poll = create_test_poll(1, "Poll");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll.clone()]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let found = repo.find_by_id(1).await.unwrap();

        assert_eq!(found, Some(poll));
    }

    #[tokio::test]
    async fn test_find_active_filters_on_window() {
        let poll = create_test_poll(1, "Poll");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll.clone()]])
                .into_connection(),
        );

        let repo = PollRepository::new(Arc::clone(&db));
        let polls = repo.find_active(date(2020, 1, 10)).await.unwrap();
        assert_eq!(polls, vec![poll]);
        drop(repo);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let sql = db
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(sql.contains(r#""poll"."start_date" <= $1"#));
        assert!(sql.contains(r#""poll"."end_date" >= $2"#));
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let poll = create_test_poll(7, "Poll");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll.clone()]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let created = repo
            .create(poll::ActiveModel {
                title: Set("Poll".to_string()),
                start_date: Set(date(2020, 1, 1)),
                end_date: Set(date(2020, 2, 1)),
                description: Set(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id, 7);
    }

    #[tokio::test]
    async fn test_delete_cascade_reports_existing_poll() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 5, // answers
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2, // questions
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // poll
                    },
                ])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        assert!(repo.delete_cascade(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascade_reports_missing_poll() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        assert!(!repo.delete_cascade(99).await.unwrap());
    }
}
