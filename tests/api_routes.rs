use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use grocery_manager::{EntityOps, db::GroceryStorage, router};
use serde_json::{Value, json};
use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

async fn app() -> (Router, GroceryStorage) {
    let storage = GroceryStorage::in_memory()
        .await
        .expect("failed to open in-memory store");
    let state = router::GroceryState::new(EntityOps::new(storage.clone()), BODY_LIMIT);
    (router::grocery_router(state), storage)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}

async fn seed(app: &Router, storage: &GroceryStorage) {
    let (status, _) = send(app, "POST", "/api/lists", Some(json!({"id": 1, "title": "Groceries"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    for item in [
        json!({"id": 5, "name": "Eggs", "current": 6, "minimum": 12}),
        json!({"id": 7, "name": "Milk", "current": 1, "minimum": 2}),
    ] {
        let (status, _) = send(app, "POST", "/api/items", Some(item)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    sqlx::query(
        "INSERT INTO list_item (on_list, grocery_item_id, quantity, checked, position) VALUES (1, 7, 2, 0, 4)",
    )
    .execute(storage.pool())
    .await
    .expect("failed to seed list item");
}

#[tokio::test]
async fn patch_list_title_updates_row() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "PATCH", "/api/lists/1", Some(json!({"title": "Milk run"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "title": "Milk run"}));

    let (_, body) = send(&app, "GET", "/api/lists/1", None).await;
    assert_eq!(body["title"], "Milk run");
}

#[tokio::test]
async fn patch_list_item_only_touches_checked() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "PATCH", "/api/lists/1/7", Some(json!({"checked": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"on_list": 1, "grocery_item_id": 7, "quantity": 2, "checked": 1, "position": 4})
    );

    let (_, items) = send(&app, "GET", "/api/lists/1/items", None).await;
    assert_eq!(items.as_array().map(Vec::len), Some(1));
    assert_eq!(items[0]["checked"], 1);
}

#[tokio::test]
async fn empty_patch_returns_current_item_without_writing() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "PATCH", "/api/items/5", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 5, "name": "Eggs", "current": 6, "minimum": 12}));
}

#[tokio::test]
async fn patch_unknown_ids_are_not_found() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "PATCH", "/api/lists/99", Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, "PATCH", "/api/lists/1/5", Some(json!({"quantity": 3}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/items/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "PATCH", "/api/items/5", Some(json!({"minimum": "lots"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(&app, "PATCH", "/api/lists/1", Some(json!(["title"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/items", Some(json!({"id": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PATCH");
}

#[tokio::test]
async fn duplicate_create_is_a_conflict() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, body) = send(&app, "POST", "/api/lists", Some(json!({"id": 1}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn delete_list_removes_its_items() {
    let (app, storage) = app().await;
    seed(&app, &storage).await;

    let (status, _) = send(&app, "DELETE", "/api/lists/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/lists/1/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, items) = send(&app, "GET", "/api/items", None).await;
    assert_eq!(items.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let (app, _storage) = app().await;

    let oversized_title = "a".repeat(BODY_LIMIT + 1024);
    let (status, body) = send(
        &app,
        "POST",
        "/api/lists",
        Some(json!({"id": 2, "title": oversized_title})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"]["message"], "request body too large");
}

#[tokio::test]
async fn file_backed_store_bootstraps_schema() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "grocery-manager-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let mut cfg = grocery_manager::config::Config::default();
    cfg.database_url = format!("sqlite:{}", temp_path.display());
    cfg.max_connections = 2;

    let ops = EntityOps::from_config(&cfg).await.expect("failed to open store");
    let app = router::grocery_router(router::GroceryState::new(ops, cfg.body_limit));

    let (status, _) = send(&app, "POST", "/api/items", Some(json!({"id": 1, "name": "Bread"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "PATCH", "/api/items/1", Some(json!({"current": 3}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Bread", "current": 3, "minimum": 0}));

    let _ = fs::remove_file(&temp_path);
}
