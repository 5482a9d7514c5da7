//! Tweet entity.
//!
//! One table holds root tweets, replies and retweet records. A retweet record
//! is its own row owned by the retweeting user, with `original_tweet_id`
//! pointing at the root it mirrors.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tweet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author
    pub user_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Case-folded content, for search
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub content_lower: String,

    #[sea_orm(nullable)]
    pub image: Option<String>,

    /// Parent tweet, for replies. May dangle after the parent is deleted.
    #[sea_orm(nullable)]
    pub reply_to_id: Option<String>,

    /// Root tweet, for retweet records
    #[sea_orm(nullable)]
    pub original_tweet_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_reply: bool,

    #[sea_orm(default_value = false)]
    pub is_retweet: bool,

    /// Number of retweet records pointing at this tweet
    #[sea_orm(default_value = 0)]
    pub retweet_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::OriginalTweetId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    OriginalTweet,

    #[sea_orm(has_many = "super::tweet_like::Entity")]
    Likes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::tweet_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
