//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Handle as typed at registration
    pub username: String,

    /// Case-folded handle; uniqueness is enforced here
    #[sea_orm(unique)]
    pub username_lower: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password: String,

    /// Access token
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,

    /// Display name
    pub name: String,

    /// Case-folded display name, for search
    #[serde(skip_serializing)]
    pub name_lower: String,

    #[sea_orm(nullable)]
    pub bio: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    #[sea_orm(nullable)]
    pub profile_image_url: Option<String>,

    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    /// Number of `following` rows with this user as followee
    #[sea_orm(default_value = 0)]
    pub followers_count: i32,

    /// Number of `following` rows with this user as follower
    #[sea_orm(default_value = 0)]
    pub following_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tweet::Entity")]
    Tweets,
}

impl Related<super::tweet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
