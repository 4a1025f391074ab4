#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use diesel::{Connection, PgConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl, pooled_connection::AsyncDieselConnectionManager};
use diesel_migrations::MigrationHarness;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use storefront::{
    auth::models::NewUser,
    config::Config,
    pool::{MIGRATIONS, get_pool},
    schema::users,
    state::AppState,
    utils::types::Pool,
};

pub const IDENTITY: &str = "x-user-id";

pub fn config(database_url: &str) -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.to_owned()),
        _ => None,
    })
    .unwrap()
}

/// Router over a pool that never connects; for requests rejected before
/// any query runs.
pub fn offline_app() -> Router {
    let config = config("postgres://storefront@127.0.0.1:1/offline");
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let pool = bb8::Pool::builder()
        .connection_timeout(Duration::from_millis(200))
        .build_unchecked(manager);

    storefront::app(AppState::new(pool, config))
}

static MIGRATED: Once = Once::new();

/// Pool and router against `TEST_DATABASE_URL`, or `None` when it is unset.
pub async fn database() -> Option<(Pool, Router)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    MIGRATED.call_once(|| {
        let mut conn = PgConnection::establish(&url).unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
    });

    let config = config(&url);
    let pool = get_pool(&config).await.unwrap();
    let app = storefront::app(AppState::new(pool.clone(), config));

    Some((pool, app))
}

pub async fn create_user(pool: &Pool) -> Uuid {
    let id = Uuid::new_v4();
    let username = format!("user-{id}");
    let email = format!("{id}@example.com");

    let mut conn = pool.get().await.unwrap();
    diesel::insert_into(users::table)
        .values(NewUser {
            id,
            username: &username,
            email: &email,
        })
        .execute(&mut conn)
        .await
        .unwrap();

    id
}

pub fn request(method: &str, uri: &str, user: Option<Uuid>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(IDENTITY, user.to_string());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Creates a product through the API and returns its id.
pub async fn create_product(app: &Router, body: Value) -> i64 {
    let (status, json) = send(app, request("POST", "/api/products", None, Some(&body.to_string()))).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_i64().unwrap()
}

/// Creates a category through the API and returns its id.
pub async fn create_category(app: &Router, title: &str, parent: Option<i64>) -> i64 {
    let body = serde_json::json!({"title": title, "parent": parent}).to_string();
    let (status, json) = send(app, request("POST", "/api/categories", None, Some(&body))).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_i64().unwrap()
}

pub fn unique_slug(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
