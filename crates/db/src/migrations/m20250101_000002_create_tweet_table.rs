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
                    .col(ColumnDef::new(Tweet::ContentLower).text().not_null())
                    .col(ColumnDef::new(Tweet::Image).string_len(1024))
                    .col(ColumnDef::new(Tweet::ReplyToId).string_len(32))
                    .col(ColumnDef::new(Tweet::OriginalTweetId).string_len(32))
                    .col(
                        ColumnDef::new(Tweet::IsReply)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tweet::IsRetweet)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tweet::RetweetCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
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
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_original")
                            .from(Tweet::Table, Tweet::OriginalTweetId)
                            .to(Tweet::Table, Tweet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, original_tweet_id) - one retweet record per user and original
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_user_original")
                    .table(Tweet::Table)
                    .col(Tweet::UserId)
                    .col(Tweet::OriginalTweetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: original_tweet_id (for counting retweets)
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_original_tweet_id")
                    .table(Tweet::Table)
                    .col(Tweet::OriginalTweetId)
                    .to_owned(),
            )
            .await?;

        // Index: reply_to_id (for listing replies)
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_reply_to_id")
                    .table(Tweet::Table)
                    .col(Tweet::ReplyToId)
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) (for profile and home timelines)
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_user_created_at")
                    .table(Tweet::Table)
                    .col(Tweet::UserId)
                    .col(Tweet::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for global listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_created_at")
                    .table(Tweet::Table)
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
    ContentLower,
    Image,
    ReplyToId,
    OriginalTweetId,
    IsReply,
    IsRetweet,
    RetweetCount,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
