//! Question repository.

use std::sync::Arc;

use crate::entities::{Answer, Question, answer, question};
use polling_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All questions, optionally restricted to one poll.
    pub async fn find_all(&self, poll_id: Option<i64>) -> AppResult<Vec<question::Model>> {
        let mut query = Question::find();
        if let Some(poll_id) = poll_id {
            query = query.filter(question::Column::PollId.eq(poll_id));
        }

        query
            .order_by_asc(question::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a question.
    pub async fn update(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a question together with its answers.
    ///
    /// Returns `false` when no question with this ID existed.
    pub async fn delete_cascade(&self, id: i64) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Answer::delete_many()
            .filter(answer::Column::QuestionId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Question::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::QuestionType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_question(id: i64, poll_id: i64) -> question::Model {
        question::Model {
            id,
            poll_id,
            text: format!("Question_{id}"),
            question_type: QuestionType::SingleOption,
        }
    }

    #[tokio::test]
    async fn test_find_all_without_filter() {
        let q1 = create_test_question(1, 1);
        let q2 = create_test_question(2, 2);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[q1.clone(), q2.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let result = repo.find_all(None).await.unwrap();

        assert_eq!(result, vec![q1, q2]);
    }

    #[tokio::test]
    async fn test_find_all_by_poll() {
        let q1 = create_test_question(1, 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[q1.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(Arc::clone(&db));
        let result = repo.find_all(Some(3)).await.unwrap();
        assert_eq!(result, vec![q1]);
        drop(repo);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let sql = db
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(sql.contains(r#""question"."poll_id" = $1"#));
    }

    #[tokio::test]
    async fn test_create_keeps_type() {
        let question = create_test_question(4, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let created = repo
            .create(question::ActiveModel {
                poll_id: Set(1),
                text: Set("Question_4".to_string()),
                question_type: Set(QuestionType::SingleOption),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.question_type, QuestionType::SingleOption);
    }

    #[tokio::test]
    async fn test_delete_cascade() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 3,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        assert!(repo.delete_cascade(1).await.unwrap());
    }
}
