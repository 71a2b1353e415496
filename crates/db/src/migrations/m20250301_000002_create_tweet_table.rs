//! Create tweet table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tweet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tweet::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tweet::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Tweet::Content).text().not_null())
                    .col(
                        ColumnDef::new(Tweet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_user")
                            .from(Tweet::Table, Tweet::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (created_at, id) - the feed's keyset pagination order
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_created_at_id")
                    .table(Tweet::Table)
                    .col(Tweet::CreatedAt)
                    .col(Tweet::Id)
                    .to_owned(),
            )
            .await?;

        // Composite index: (user_id, created_at) for profile feeds
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_user_id_created_at")
                    .table(Tweet::Table)
                    .col(Tweet::UserId)
                    .col(Tweet::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tweet::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tweet {
    Table,
    Id,
    UserId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
