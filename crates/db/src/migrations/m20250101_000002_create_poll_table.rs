//! Create poll table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poll::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poll::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Poll::StartDate).date().not_null())
                    .col(ColumnDef::new(Poll::EndDate).date().not_null())
                    .col(ColumnDef::new(Poll::Description).text().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        // Unique index: title
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_title")
                    .table(Poll::Table)
                    .col(Poll::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (start_date, end_date) for the active window filter
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_active_window")
                    .table(Poll::Table)
                    .col(Poll::StartDate)
                    .col(Poll::EndDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    Title,
    StartDate,
    EndDate,
    Description,
}
