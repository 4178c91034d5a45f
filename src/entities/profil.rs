use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movie ids a profile marked as favorite, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct FavoriteIds(pub Vec<Uuid>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profil")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    /// Marks the profile currently selected by its user. At most one per user.
    pub in_use: bool,
    #[sea_orm(column_type = "Json")]
    pub favorite_ids: FavoriteIds,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::movie_watch_time::Entity")]
    MovieWatchTime,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::movie_watch_time::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieWatchTime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
