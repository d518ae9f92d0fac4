//! Create answer table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Answer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Answer::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Answer::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Answer::QuestionId).big_integer().not_null())
                    .col(ColumnDef::new(Answer::Answer).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_question")
                            .from(Answer::Table, Answer::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: question_id (for cascading deletes)
        manager
            .create_index(
                Index::create()
                    .name("idx_answer_question_id")
                    .table(Answer::Table)
                    .col(Answer::QuestionId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for the per-user answer listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_answer_user_id")
                    .table(Answer::Table)
                    .col(Answer::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Answer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Answer {
    Table,
    Id,
    UserId,
    QuestionId,
    Answer,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}
