//! View cache tests
//!
//! Run only when TEST_REDIS_URL points at a Redis instance, e.g.
//! `TEST_REDIS_URL=redis://localhost:6379/15`. Keys are per post id, so
//! runs do not need a flushed database.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::TestApp;
use murmur::app::store::EngagementStore;
use murmur::domain::engagement::{NewReaction, ReactionKind};
use murmur::domain::notification::{NewNotification, NotificationType};
use serde_json::json;
use uuid::Uuid;

/// Waits for the eviction consumer to drop the cached view of `post_id`.
async fn wait_for_eviction(app: &TestApp, post_id: Uuid) {
    let evicted = tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.views.get_post(post_id).await.is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(evicted.is_ok(), "cached view was never evicted");
}

#[tokio::test]
async fn card_reflects_toggle_while_view_is_cached() {
    let Some(app) = TestApp::with_redis_views().await else { return };
    let reader = app.create_user("reader");
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;
    let path = format!("/posts/{}", post_id);

    let resp = app.get(&path, Some(&reader.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["counts"]["likes"], 0);
    assert!(app.state.views.get_post(post_id).await.is_some());

    app.post(&format!("{}/like", path), Some(&reader.access_token))
        .await;

    // Read straight away, before the consumer has had a chance to evict.
    let card = app.get(&path, Some(&reader.access_token)).await.json();
    assert_eq!(card["counts"]["likes"], 1);
    assert_eq!(card["viewer"]["is_liked"], true);
}

#[tokio::test]
async fn cached_view_never_hides_store_writes() {
    let Some(app) = TestApp::with_redis_views().await else { return };
    let reader = app.create_user("reader");
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;
    let path = format!("/posts/{}", post_id);

    app.get(&path, None).await;
    assert!(app.state.views.get_post(post_id).await.is_some());

    // Written behind the service, so no invalidation is published.
    app.memory
        .insert_reaction(
            NewReaction {
                author_id: reader.id,
                post_id,
                kind: ReactionKind::Repost,
            },
            NewNotification::for_post(author.id, reader.id, post_id, NotificationType::Repost),
        )
        .await
        .unwrap();

    let card = app.get(&path, None).await.json();
    assert_eq!(card["counts"]["reposts"], 1);

    assert!(app.memory.delete_post(post_id, author.id).await.unwrap());
    assert!(app.state.views.get_post(post_id).await.is_some());

    let resp = app.get(&path, None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_evicts_cached_view() {
    let Some(app) = TestApp::with_redis_views().await else { return };
    let reader = app.create_user("reader");
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;
    let path = format!("/posts/{}", post_id);

    let card = app.get(&path, None).await.json();
    assert!(card["top_comment"].is_null());

    let resp = app
        .post_json(
            &format!("{}/comments", path),
            json!({ "content": "first!" }),
            Some(&reader.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    wait_for_eviction(&app, post_id).await;

    let card = app.get(&path, None).await.json();
    assert_eq!(card["counts"]["comments"], 1);
    assert_eq!(card["top_comment"]["excerpt"], "first!");
    assert_eq!(card["top_comment"]["author"]["id"], reader.id.to_string());
}

#[tokio::test]
async fn post_delete_evicts_cached_view() {
    let Some(app) = TestApp::with_redis_views().await else { return };
    let author = app.create_user("author");
    let post_id = app.create_post_for_user(author.id).await;
    let path = format!("/posts/{}", post_id);

    app.get(&path, None).await;
    let cached = app.state.views.get_post(post_id).await.unwrap();
    assert_eq!(cached.id, post_id);
    assert_eq!(cached.author.id, author.id);

    let resp = app.delete(&path, Some(&author.access_token)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    wait_for_eviction(&app, post_id).await;
    assert_eq!(app.get(&path, None).await.status, StatusCode::NOT_FOUND);
}
