use revolver::SerializerModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, SerializerModel)]
#[sea_orm(table_name = "authors")]
#[revolver(has_many(posts = "super::post::Entity"), display = "name")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[revolver(label = "Name", sort_key = 5)]
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
