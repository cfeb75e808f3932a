use axum::{routing::get, routing::post, Router};

use crate::AppState;
use crate::http::handlers;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::create_post))
        .route(
            "/posts/:id",
            get(handlers::get_post).delete(handlers::delete_post),
        )
        .route("/posts/:id/like", post(handlers::toggle_like))
        .route("/posts/:id/repost", post(handlers::toggle_repost))
        .route(
            "/posts/:id/comments",
            post(handlers::add_comment).get(handlers::list_comments),
        )
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/:id/read",
            post(handlers::mark_notification_read),
        )
}
