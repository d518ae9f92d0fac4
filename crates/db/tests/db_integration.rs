//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `polling_test`)
//!   `TEST_DB_PASSWORD` (default: `polling_test`)
//!   `TEST_DB_NAME` (default: `polling_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use polling_db::{
    entities::{QuestionType, answer, poll, question},
    repositories::{AnswerRepository, PollRepository, QuestionRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::Set;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_poll(polls: &PollRepository, title: &str) -> poll::Model {
    polls
        .create(poll::ActiveModel {
            title: Set(title.to_string()),
            start_date: Set(date(2020, 1, 1)),
            end_date: Set(date(2020, 1, 31)),
            description: Set(String::new()),
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn seed_question(questions: &QuestionRepository, poll_id: i64) -> question::Model {
    questions
        .create(question::ActiveModel {
            poll_id: Set(poll_id),
            text: Set("Pick one".to_string()),
            question_type: Set(QuestionType::SingleOption),
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn seed_answer(answers: &AnswerRepository, question_id: i64) -> answer::Model {
    answers
        .create(answer::ActiveModel {
            user_id: Set(1),
            question_id: Set(question_id),
            answer: Set("1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let result = TestDatabase::with_config(TestDbConfig::default()).await;
    assert!(result.is_ok(), "Failed to migrate: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_poll_delete_cascades() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let polls = PollRepository::new(Arc::clone(&conn));
    let questions = QuestionRepository::new(Arc::clone(&conn));
    let answers = AnswerRepository::new(Arc::clone(&conn));

    let doomed = seed_poll(&polls, "Poll_1").await;
    let kept = seed_poll(&polls, "Poll_2").await;
    let q1 = seed_question(&questions, doomed.id).await;
    let q2 = seed_question(&questions, kept.id).await;
    seed_answer(&answers, q1.id).await;
    seed_answer(&answers, q1.id).await;
    seed_answer(&answers, q2.id).await;

    assert!(polls.delete_cascade(doomed.id).await.unwrap());

    assert!(polls.find_by_id(doomed.id).await.unwrap().is_none());
    assert!(questions.find_by_id(q1.id).await.unwrap().is_none());
    assert_eq!(answers.count_by_question(q1.id).await.unwrap(), 0);
    assert_eq!(answers.count_by_question(q2.id).await.unwrap(), 1);
    assert_eq!(questions.find_all(Some(kept.id)).await.unwrap().len(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_question_delete_cascades() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let polls = PollRepository::new(Arc::clone(&conn));
    let questions = QuestionRepository::new(Arc::clone(&conn));
    let answers = AnswerRepository::new(Arc::clone(&conn));

    let poll = seed_poll(&polls, "Poll_1").await;
    let question = seed_question(&questions, poll.id).await;
    let answer = seed_answer(&answers, question.id).await;

    assert!(questions.delete_cascade(question.id).await.unwrap());
    assert!(answers.find_by_id(answer.id).await.unwrap().is_none());
    assert!(polls.find_by_id(poll.id).await.unwrap().is_some());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_active_window_is_inclusive() {
    let db = TestDatabase::create_unique().await.unwrap();
    let polls = PollRepository::new(db.shared());

    let poll = seed_poll(&polls, "Poll_1").await;

    assert_eq!(polls.find_active(poll.start_date).await.unwrap().len(), 1);
    assert_eq!(polls.find_active(poll.end_date).await.unwrap().len(), 1);
    let after = poll.end_date.checked_add_days(Days::new(1)).unwrap();
    assert!(polls.find_active(after).await.unwrap().is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_title_is_a_validation_error() {
    let db = TestDatabase::create_unique().await.unwrap();
    let polls = PollRepository::new(db.shared());

    seed_poll(&polls, "Poll_1").await;
    let err = polls
        .create(poll::ActiveModel {
            title: Set("Poll_1".to_string()),
            start_date: Set(date(2020, 1, 1)),
            end_date: Set(date(2020, 1, 31)),
            description: Set(String::new()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}
