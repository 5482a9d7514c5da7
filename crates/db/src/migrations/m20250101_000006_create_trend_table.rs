//! Create trend table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trend::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trend::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Trend::Topic)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Trend::TweetCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Trend::Location)
                            .string_len(64)
                            .not_null()
                            .default("Worldwide"),
                    )
                    .col(
                        ColumnDef::new(Trend::Promoted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Trend::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: tweet_count (for ranking)
        manager
            .create_index(
                Index::create()
                    .name("idx_trend_tweet_count")
                    .table(Trend::Table)
                    .col(Trend::TweetCount)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trend::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Trend {
    Table,
    Id,
    Topic,
    TweetCount,
    Location,
    Promoted,
    CreatedAt,
}
