//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_poll_table;
mod m20250101_000003_create_question_table;
mod m20250101_000004_create_answer_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_poll_table::Migration),
            Box::new(m20250101_000003_create_question_table::Migration),
            Box::new(m20250101_000004_create_answer_table::Migration),
        ]
    }
}
