//! Notification inbox tests

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn author_sees_engagement_newest_first() {
    let app = TestApp::new();
    let reader = app.create_user("reader");
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;

    app.post(&format!("/posts/{}/like", post_id), Some(&reader.access_token))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    app.post_json(
        &format!("/posts/{}/comments", post_id),
        json!({ "content": "great" }),
        Some(&reader.access_token),
    )
    .await;

    let resp = app.get("/notifications", Some(&author.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["notification_type"], "COMMENT");
    assert_eq!(items[1]["notification_type"], "LIKE");
    assert_eq!(items[1]["related_id"], post_id.to_string());
    assert_eq!(
        items[1]["content"],
        format!("{} liked your post", reader.id)
    );

    let resp = app.get("/notifications", Some(&reader.access_token)).await;
    assert!(resp.json()["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn mark_read_once_for_recipient_only() {
    let app = TestApp::new();
    let reader = app.create_user("reader");
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;

    app.post(&format!("/posts/{}/like", post_id), Some(&reader.access_token))
        .await;
    let notification_id = app.memory.notifications_for_post(post_id)[0].id;
    let path = format!("/notifications/{}/read", notification_id);

    let resp = app.post(&path, Some(&reader.access_token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.post(&path, Some(&author.access_token)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert!(app.memory.notifications_for_post(post_id)[0].read_at.is_some());

    let resp = app.post(&path, Some(&author.access_token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inbox_requires_session_and_valid_paging() {
    let app = TestApp::new();
    let user = app.create_user("user");

    let resp = app.get("/notifications", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .get("/notifications?limit=0", Some(&user.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "limit must be between 1 and 200");

    let resp = app
        .get("/notifications?cursor=garbage", Some(&user.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post(
            &format!("/notifications/{}/read", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_ok_in_process() {
    let app = TestApp::new();

    let resp = app.get("/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], "ok");
}
