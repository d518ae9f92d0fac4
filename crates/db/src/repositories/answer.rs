//! Answer repository.

use std::sync::Arc;

use crate::entities::{Answer, answer};
use polling_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Answer repository for database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an answer by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<answer::Model>> {
        Answer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an answer by ID, only if it belongs to `user_id`.
    pub async fn find_by_id_and_user(
        &self,
        id: i64,
        user_id: i64,
    ) -> AppResult<Option<answer::Model>> {
        Answer::find_by_id(id)
            .filter(answer::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All answers.
    pub async fn find_all(&self) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .order_by_asc(answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All answers submitted by one user.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::UserId.eq(user_id))
            .order_by_asc(answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of answers to one question.
    pub async fn count_by_question(&self, question_id: i64) -> AppResult<u64> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new answer.
    pub async fn create(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an answer.
    pub async fn update(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an answer. Returns `false` when nothing was deleted.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = Answer::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_answer(id: i64, user_id: i64, question_id: i64) -> answer::Model {
        answer::Model {
            id,
            user_id,
            question_id,
            answer: "1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let a1 = create_test_answer(1, 42, 1);
        let a2 = create_test_answer(2, 42, 2);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1.clone(), a2.clone()]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_by_user(42).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|a| a.user_id == 42));
    }

    #[tokio::test]
    async fn test_find_by_id_and_user_not_owned() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<answer::Model>::new()])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_by_id_and_user(1, 7).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_count_by_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Value::BigInt(Some(3)),
                }]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let count = repo.count_by_question(1).await.unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_delete_missing_answer() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        assert!(!repo.delete(5).await.unwrap());
    }
}
