use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub genre: String,
    pub duration: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_watch_time::Entity")]
    MovieWatchTime,
}

impl Related<super::movie_watch_time::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieWatchTime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
