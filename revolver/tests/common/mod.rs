#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{StatusCode, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::{Duration, Utc};
use revolver::{ApiConfig, ApiResource, ApiState, CurrentUser, Rule};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub mod author;
pub mod comment;
pub mod post;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateBlogTables)]
    }
}

pub struct CreateBlogTables;

impl MigrationName for CreateBlogTables {
    fn name(&self) -> &'static str {
        "m20261019_000001_create_blog_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBlogTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = sea_orm::Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(author::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(post::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(comment::Entity))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(comment::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(post::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(author::Entity).to_owned())
            .await
    }
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Authors, no owner
pub struct AuthorApi;

impl ApiResource for AuthorApi {
    type Entity = author::Entity;
    type Model = author::Model;
    type ActiveModel = author::ActiveModel;
    type Column = author::Column;

    const ID_COLUMN: author::Column = author::Column::Id;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("name").required().message("name is required"),
            Rule::new("email").required().email().message("email is invalid"),
        ]
    }
}

/// Posts, readable by anyone, writable by their owner
pub struct PostApi;

impl ApiResource for PostApi {
    type Entity = post::Entity;
    type Model = post::Model;
    type ActiveModel = post::ActiveModel;
    type Column = post::Column;

    const ID_COLUMN: post::Column = post::Column::Id;
    const PUBLIC_VIEW: bool = true;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("title")
                .required()
                .string()
                .max_length(40)
                .message("title is required"),
            Rule::new("views").number().max(100_000),
        ]
    }

    fn owner_column() -> Option<post::Column> {
        Some(post::Column::OwnerId)
    }
}

/// The same posts, private to their owner
pub struct DraftApi;

impl ApiResource for DraftApi {
    type Entity = post::Entity;
    type Model = post::Model;
    type ActiveModel = post::ActiveModel;
    type Column = post::Column;

    const ID_COLUMN: post::Column = post::Column::Id;

    fn route_name() -> String {
        "drafts".to_string()
    }

    fn owner_column() -> Option<post::Column> {
        Some(post::Column::OwnerId)
    }
}

pub struct CommentApi;

impl ApiResource for CommentApi {
    type Entity = comment::Entity;
    type Model = comment::Model;
    type ActiveModel = comment::ActiveModel;
    type Column = comment::Column;

    const ID_COLUMN: comment::Column = comment::Column::Id;
}

fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// Trusts `x-user` and `x-superuser` headers.
async fn fake_auth(mut req: Request, next: Next) -> Response {
    let user = header_value(&req, "x-user");
    let superuser = header_value(&req, "x-superuser");
    let current = match (user, superuser) {
        (_, Some(id)) => Some(CurrentUser::superuser(id)),
        (Some(id), None) => Some(CurrentUser::new(id)),
        (None, None) => None,
    };
    if let Some(current) = current {
        req.extensions_mut().insert(current);
    }
    next.run(req).await
}

pub fn app_with_config(db: DatabaseConnection, config: ApiConfig) -> Router {
    let router = Router::new();
    let router = revolver::register::<AuthorApi, _>(router, "/api/authors");
    let router = revolver::register::<PostApi, _>(router, "/api/posts");
    let router = revolver::register::<DraftApi, _>(router, "/api/drafts/");
    let router = router.merge(revolver::router::<CommentApi>());
    router
        .layer(middleware::from_fn(fake_auth))
        .with_state(ApiState::new(db).with_config(config))
}

pub fn app(db: DatabaseConnection) -> Router {
    app_with_config(db, ApiConfig::default())
}

/// A request sender that remembers who is calling.
pub struct Client {
    pub app: Router,
    pub user: Option<(&'static str, &'static str)>,
}

impl Client {
    pub fn new(app: Router) -> Self {
        Self { app, user: None }
    }

    pub fn as_user(&self, id: &'static str) -> Self {
        Self {
            app: self.app.clone(),
            user: Some(("x-user", id)),
        }
    }

    pub fn as_superuser(&self, id: &'static str) -> Self {
        Self {
            app: self.app.clone(),
            user: Some(("x-superuser", id)),
        }
    }

    pub async fn raw(
        &self,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some((name, id)) = self.user {
            builder = builder.header(name, id);
        }
        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        into_json(self.raw("GET", uri, None, Body::empty()).await).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        into_json(self.raw("DELETE", uri, None, Body::empty()).await).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .raw(method, uri, Some("application/json"), Body::from(body.to_string()))
            .await;
        into_json(response).await
    }

    pub async fn send_form(&self, method: &str, uri: &str, form: &str) -> (StatusCode, Value) {
        let response = self
            .raw(
                method,
                uri,
                Some("application/x-www-form-urlencoded"),
                Body::from(form.to_string()),
            )
            .await;
        into_json(response).await
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn into_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn seed_author(db: &DatabaseConnection, name: &str) -> author::Model {
    author::ActiveModel {
        name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase())),
        password: Set("hunter2".to_string()),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Post with `views` views, owned by `owner`, created `age_minutes` ago.
pub async fn seed_post(
    db: &DatabaseConnection,
    author: &author::Model,
    owner: &str,
    title: &str,
    views: i32,
    age_minutes: i64,
) -> post::Model {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    post::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        body: Set(Some(format!("{title} body text"))),
        views: Set(views),
        published: Set(views > 0),
        author_id: Set(author.id),
        owner_id: Set(owner.to_string()),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_comment(db: &DatabaseConnection, post: &post::Model, content: &str) -> comment::Model {
    comment::ActiveModel {
        post_id: Set(post.id),
        content: Set(content.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
