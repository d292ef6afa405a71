use revolver::SerializerModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, SerializerModel)]
#[sea_orm(table_name = "posts")]
#[revolver(
    belongs_to(author = "super::author::Entity"),
    has_many(comments = "super::comment::Entity"),
    display = "title",
    extra = "post_extra"
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[revolver(label = "Title", sort_key = 4)]
    pub title: String,
    pub body: Option<String>,
    #[revolver(label = "Views")]
    pub views: i32,
    #[revolver(label = "Published")]
    pub published: bool,
    pub author_id: i32,
    #[revolver(exclude_fillable)]
    pub owner_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Computed keys: a short excerpt, and a `title` that must not override the column.
async fn post_extra(
    post: &Model,
    _db: &DatabaseConnection,
) -> Result<serde_json::Map<String, serde_json::Value>, DbErr> {
    let mut extra = serde_json::Map::new();
    let excerpt: String = post.body.as_deref().unwrap_or_default().chars().take(10).collect();
    extra.insert("excerpt".to_string(), serde_json::Value::String(excerpt));
    extra.insert("title".to_string(), serde_json::Value::String("shadowed".to_string()));
    Ok(extra)
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
