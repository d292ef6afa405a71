mod common;

use axum::body::Body;
use common::{
    Client, PostApi, app, app_with_config, post, seed_author, seed_comment, seed_post,
    setup_test_db,
};
use revolver::{ApiConfig, ApiResource};
use sea_orm::{ColumnTrait, Condition, Order};
use serde_json::Value;

fn titles(json: &Value) -> Vec<&str> {
    json["data"]["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_pages_and_envelope() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    for i in 0..12 {
        seed_post(&db, &author, "u1", &format!("post {i:02}"), i, 100 - i64::from(i)).await;
    }
    let client = Client::new(app(db));

    let (status, json) = client.get("/api/posts?page=2&size=5").await;
    assert_eq!(status, 200);
    assert_eq!(json["code"], 200);
    assert_eq!(json["message"], "fetched successfully");
    assert_eq!(json["data"]["pageable"]["page"], 2);
    assert_eq!(json["data"]["pageable"]["size"], 5);
    assert_eq!(json["data"]["pageable"]["total"], 12);
    assert_eq!(json["data"]["pageable"]["totalPage"], 3);
    // newest first by default
    assert_eq!(
        titles(&json),
        vec!["post 06", "post 05", "post 04", "post 03", "post 02"]
    );

    let (_, json) = client.get("/api/posts?page=9&size=5").await;
    assert!(json["data"]["list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_content_range_header() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    for i in 0..3 {
        seed_post(&db, &author, "u1", &format!("post {i}"), i, 0).await;
    }
    let client = Client::new(app(db));

    let response = client.raw("GET", "/api/posts?size=2", None, Body::empty()).await;
    assert_eq!(response.headers()["content-range"], "posts 0-1/3");
}

#[tokio::test]
async fn test_list_size_is_clamped() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    for i in 0..4 {
        seed_post(&db, &author, "u1", &format!("post {i}"), i, 0).await;
    }
    let config = ApiConfig {
        max_page_size: 3,
        ..ApiConfig::default()
    };
    let client = Client::new(app_with_config(db, config));

    let (_, json) = client.get("/api/posts?size=500&page=0").await;
    assert_eq!(json["data"]["pageable"]["size"], 3);
    assert_eq!(json["data"]["pageable"]["page"], 1);
    assert_eq!(json["data"]["list"].as_array().unwrap().len(), 3);

    let (status, json) = client.get("/api/posts?size=ten").await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "size must be a positive integer");
}

#[tokio::test]
async fn test_list_page_beyond_any_offset() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    seed_post(&db, &author, "u1", "only", 1, 0).await;
    let client = Client::new(app(db));

    let (status, json) = client.get("/api/posts?page=1000000000000000000&size=10").await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "page out of range");

    // far but representable pages are simply empty
    let response = client
        .raw("GET", "/api/posts?page=1000000&size=10", None, Body::empty())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-range"], "posts */1");
}

#[tokio::test]
async fn test_list_without_rows_has_empty_range() {
    let db = setup_test_db().await.unwrap();
    let client = Client::new(app(db));

    let response = client.raw("GET", "/api/posts", None, Body::empty()).await;
    assert_eq!(response.headers()["content-range"], "posts */0");
}

#[tokio::test]
async fn test_resource_queries() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    seed_post(&db, &author, "u1", "a", 1, 2).await;
    seed_post(&db, &author, "u2", "b", 2, 1).await;

    let mine = Condition::all().add(post::Column::OwnerId.eq("u1"));
    assert_eq!(PostApi::total_count(&db, mine.clone()).await.unwrap(), 1);
    assert_eq!(PostApi::total_count(&db, Condition::all()).await.unwrap(), 2);

    let found = PostApi::get_one(&db, mine).await.unwrap().unwrap();
    assert_eq!(found.title, "a");

    let order = [(post::Column::Views, Order::Desc)];
    let rows = PostApi::get_all(&db, Condition::all(), &order, 0, 10)
        .await
        .unwrap();
    let titles: Vec<_> = rows.iter().map(|row| row.title.as_str()).collect();
    assert_eq!(titles, ["b", "a"]);
}

#[tokio::test]
async fn test_list_filters() {
    let db = setup_test_db().await.unwrap();
    let ada = seed_author(&db, "Ada").await;
    let bob = seed_author(&db, "Bob").await;
    seed_post(&db, &ada, "u1", "Rust ownership", 50, 3).await;
    seed_post(&db, &ada, "u1", "Async Rust", 5, 2).await;
    seed_post(&db, &bob, "u2", "Gardening", 0, 1).await;
    let client = Client::new(app(db));

    let (_, json) = client.get("/api/posts?title__contains=Rust&order_by=title").await;
    assert_eq!(titles(&json), vec!["Async Rust", "Rust ownership"]);

    let (_, json) = client.get("/api/posts?views__gte=5&views__lt=50").await;
    assert_eq!(titles(&json), vec!["Async Rust"]);

    let (_, json) = client.get(&format!("/api/posts?author_id={}", bob.id)).await;
    assert_eq!(titles(&json), vec!["Gardening"]);

    let (_, json) = client.get("/api/posts?views__in=0,50&order_by=-views").await;
    assert_eq!(titles(&json), vec!["Rust ownership", "Gardening"]);

    let (_, json) = client.get("/api/posts?published=false").await;
    assert_eq!(titles(&json), vec!["Gardening"]);

    let (_, json) = client.get("/api/posts?body__isnull=true").await;
    assert_eq!(json["data"]["pageable"]["total"], 0);

    // unknown columns and empty values are ignored
    let (_, json) = client.get("/api/posts?colour=red&title=").await;
    assert_eq!(json["data"]["pageable"]["total"], 3);
}

#[tokio::test]
async fn test_list_bad_filters() {
    let db = setup_test_db().await.unwrap();
    let client = Client::new(app(db));

    let (status, json) = client.get("/api/posts?views__around=3").await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "unsupported lookup: views__around");

    let (status, json) = client.get("/api/posts?views__gt=many").await;
    assert_eq!(status, 400);
    assert!(json["message"].as_str().unwrap().starts_with("invalid value for views"));
}

#[tokio::test]
async fn test_list_ordering() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    seed_post(&db, &author, "u1", "b", 2, 3).await;
    seed_post(&db, &author, "u1", "a", 2, 2).await;
    seed_post(&db, &author, "u1", "c", 1, 1).await;
    let client = Client::new(app(db));

    let (_, json) = client.get("/api/posts?order_by=-views,title").await;
    assert_eq!(titles(&json), vec!["a", "b", "c"]);

    let (_, json) = client.get("/api/posts?order_by=title_desc").await;
    assert_eq!(titles(&json), vec!["c", "b", "a"]);

    // unknown columns fall back to the default order
    let (_, json) = client.get("/api/posts?order_by=popularity").await;
    assert_eq!(titles(&json), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_list_embeds_relations() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    let post = seed_post(&db, &author, "u1", "Hello", 1, 0).await;
    seed_comment(&db, &post, "first!").await;
    seed_comment(&db, &post, "second").await;
    let client = Client::new(app(db));

    let (_, json) = client.get("/api/posts").await;
    let item = &json["data"]["list"][0];

    assert_eq!(item["id"], post.id.to_string());
    assert_eq!(item["comments_count"], 2);
    assert_eq!(item["comments"], serde_json::json!(["first!", "second"]));
    assert_eq!(item["author"]["name"], "Ada");
    assert_eq!(item["author"]["posts"], serde_json::json!(["Hello"]));
    assert_eq!(item["author"]["posts_count"], 1);
    assert!(item["author"].get("password").is_none());
    assert!(item["author"].get("is_deleted").is_none());

    // extra keys are merged without shadowing columns
    assert_eq!(item["excerpt"], "Hello body");
    assert_eq!(item["title"], "Hello");
}

#[tokio::test]
async fn test_relation_depth_follows_config() {
    let db = setup_test_db().await.unwrap();
    let author = seed_author(&db, "Ada").await;
    let post = seed_post(&db, &author, "u1", "Hello", 1, 0).await;
    seed_comment(&db, &post, "first!").await;
    let config = ApiConfig {
        max_relation_depth: 1,
        ..ApiConfig::default()
    };
    let client = Client::new(app_with_config(db, config));

    let (status, json) = client.get("/comments").await;
    assert_eq!(status, 200);
    let item = &json["data"]["list"][0];
    assert_eq!(item["content"], "first!");
    assert_eq!(item["post"]["title"], "Hello");
    assert!(item["post"].is_object());
    assert!(item["post"].get("author").is_none());
    assert!(item["post"].get("comments").is_none());
}

#[tokio::test]
async fn test_list_hides_excluded_columns() {
    let db = setup_test_db().await.unwrap();
    seed_author(&db, "Ada").await;
    let client = Client::new(app(db));

    let (_, json) = client.get("/api/authors").await;
    let item = &json["data"]["list"][0];
    assert_eq!(item["email"], "ada@example.com");
    assert!(item.get("password").is_none());
    assert_eq!(item["posts_count"], 0);
}
