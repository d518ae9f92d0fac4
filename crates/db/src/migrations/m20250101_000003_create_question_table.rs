//! Create question table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Question::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Question::PollId).big_integer().not_null())
                    .col(ColumnDef::new(Question::Text).text().not_null())
                    .col(ColumnDef::new(Question::Type).string_len(2).not_null())
                    // Deletion order is handled by the repositories
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_poll")
                            .from(Question::Table, Question::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: poll_id (for the ?poll= filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_poll_id")
                    .table(Question::Table)
                    .col(Question::PollId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    PollId,
    Text,
    Type,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
