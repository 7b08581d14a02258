//! HTTP integration tests for the `/folders` routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user_token, delete_auth, get_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_list_and_delete_folder(pool: PgPool) {
    let (_, token) = create_user_token(&pool, "alice").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/folders", &token, json!({ "name": " Home " })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let folder_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/folders", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["name"], "Home");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/folders/{folder_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/folders/{folder_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_folder_name_is_rejected(pool: PgPool) {
    let (_, token) = create_user_token(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/folders", &token, json!({ "name": "  " })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tasks_filter_by_folder(pool: PgPool) {
    let (_, token) = create_user_token(&pool, "alice").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/folders", &token, json!({ "name": "Work" })).await;
    let folder_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/tasks",
        &token,
        json!({ "title": "report", "folder_id": folder_id }),
    )
    .await;
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/tasks", &token, json!({ "title": "laundry" })).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/tasks?folder_id={folder_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["title"], "Report");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/tasks", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["title"], "Laundry");
}
