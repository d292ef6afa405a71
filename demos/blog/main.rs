//! Blog API with authors and posts.
//!
//! ```bash
//! cargo run --example blog
//! ```
//!
//! Then try:
//!
//! ```bash
//! curl -X POST localhost:3000/authors.create -d 'name=Ada&email=ada@example.com'
//! curl -X POST localhost:3000/posts.create -H 'x-user: 1' \
//!      -H 'content-type: application/json' -d '{"title": "Hello", "author_id": 1}'
//! curl 'localhost:3000/posts?title__icontains=hel&order_by=-created_at'
//! curl -OJ localhost:3000/posts.export
//! ```

use axum::{Router, extract::Request, middleware::Next, response::Response};
use revolver::{ApiResource, ApiState, CurrentUser, Rule};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env;
use tracing_subscriber::EnvFilter;

mod author {
    use revolver::SerializerModel;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, SerializerModel)]
    #[sea_orm(table_name = "authors")]
    #[revolver(has_many(posts = "super::post::Entity"), display = "name")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[revolver(label = "Name", sort_key = 3)]
        pub name: String,
        #[sea_orm(unique)]
        #[revolver(label = "Email")]
        pub email: String,
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
}

mod post {
    use revolver::SerializerModel;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, SerializerModel)]
    #[sea_orm(table_name = "posts")]
    #[revolver(belongs_to(author = "super::author::Entity"), display = "title")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[revolver(label = "Title", sort_key = 3)]
        pub title: String,
        pub body: Option<String>,
        #[revolver(label = "Published")]
        pub published: bool,
        pub author_id: i32,
        #[revolver(exclude_fillable)]
        pub owner_id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::author::Entity",
            from = "Column::AuthorId",
            to = "super::author::Column::Id"
        )]
        Author,
    }

    impl Related<super::author::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Author.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

struct AuthorApi;

impl ApiResource for AuthorApi {
    type Entity = author::Entity;
    type Model = author::Model;
    type ActiveModel = author::ActiveModel;
    type Column = author::Column;

    const ID_COLUMN: author::Column = author::Column::Id;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("name").required().string().max_length(60),
            Rule::new("email").required().message("email is required"),
        ]
    }
}

struct PostApi;

impl ApiResource for PostApi {
    type Entity = post::Entity;
    type Model = post::Model;
    type ActiveModel = post::ActiveModel;
    type Column = post::Column;

    const ID_COLUMN: post::Column = post::Column::Id;
    const PUBLIC_VIEW: bool = true;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("title").required().string().max_length(120),
            Rule::new("author_id").required().number().min(1),
        ]
    }

    fn owner_column() -> Option<post::Column> {
        Some(post::Column::OwnerId)
    }
}

/// Treats the `x-user` header as the logged-in user. Demo only.
async fn header_auth(mut req: Request, next: Next) -> Response {
    let user = req
        .headers()
        .get("x-user")
        .and_then(|value| value.to_str().ok())
        .map(CurrentUser::new);
    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut author_table = schema.create_table_from_entity(author::Entity);
    let mut post_table = schema.create_table_from_entity(post::Entity);
    author_table.if_not_exists();
    post_table.if_not_exists();
    db.execute(backend.build(&author_table)).await?;
    db.execute(backend.build(&post_table)).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("revolver=debug,info")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&database_url).await?;
    create_tables(&db).await?;

    let app = Router::new();
    let app = revolver::register::<AuthorApi, _>(app, "/authors");
    let app = revolver::register::<PostApi, _>(app, "/posts");
    let app = app
        .layer(axum::middleware::from_fn(header_auth))
        .with_state(ApiState::new(db));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("blog API listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
