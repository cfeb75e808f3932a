use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::engagement::EngagementService;
use crate::app::notifications::NotificationService;
use crate::app::posts::PostService;
use crate::app::session::{require_actor, Actor};
use crate::app::store::{Cursor, EngagementStore};
use crate::domain::engagement::{Comment, ReactionKind, ToggleState};
use crate::domain::notification::Notification;
use crate::domain::post::{Post, PostCard};
use crate::http::{AppError, Session};
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 30;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl PaginationQuery {
    fn resolve(self) -> Result<(Option<Cursor>, i64), AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::bad_request("limit must be between 1 and 200"));
        }
        Ok((parse_cursor(self.cursor)?, limit))
    }
}

fn parse_cursor(cursor: Option<String>) -> Result<Option<Cursor>, AppError> {
    let Some(cursor) = cursor else {
        return Ok(None);
    };

    let mut parts = cursor.splitn(2, '/');
    let timestamp = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;
    let id = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;

    let timestamp = OffsetDateTime::parse(timestamp, &Rfc3339)
        .map_err(|_| AppError::bad_request("invalid cursor"))?;
    let id = Uuid::parse_str(id).map_err(|_| AppError::bad_request("invalid cursor"))?;

    Ok(Some((timestamp, id)))
}

fn encode_cursor(cursor: Option<Cursor>) -> Option<String> {
    let (timestamp, id) = cursor?;
    let timestamp = timestamp.format(&Rfc3339).ok()?;
    Some(format!("{}/{}", timestamp, id))
}

/// Trims the look-ahead row and points the cursor at the last row served.
fn into_page<T, F>(mut items: Vec<T>, limit: i64, key: F) -> ListResponse<T>
where
    F: Fn(&T) -> Cursor,
{
    let limit = usize::try_from(limit).unwrap_or(0);
    let next_cursor = if items.len() > limit {
        items.truncate(limit);
        items.last().map(&key)
    } else {
        None
    };

    ListResponse {
        items,
        next_cursor: encode_cursor(next_cursor),
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.ping().await.is_ok();
    let views = state.views.ping().await.is_ok();
    let status = if store && views { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image: Option<String>,
}

pub async fn create_post(
    Session(session): Session,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let actor = require_actor(session)?;

    let service = PostService::new(state.store, state.invalidations, state.views);
    let post = service
        .create_post(&actor, payload.content, payload.image)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
) -> Result<Json<PostCard>, AppError> {
    let service = PostService::new(state.store, state.invalidations, state.views);
    let card = service
        .post_card(session.as_ref(), id, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(card))
}

pub async fn delete_post(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let actor = require_actor(session)?;

    let service = PostService::new(state.store, state.invalidations, state.views);
    service.delete_post(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub state: ToggleState,
}

async fn toggle(
    state: AppState,
    session: Option<Actor>,
    post_id: Uuid,
    kind: ReactionKind,
) -> Result<Json<ToggleResponse>, AppError> {
    let actor = require_actor(session)?;

    let service = EngagementService::new(state.store, state.invalidations);
    let state = service.toggle_reaction(&actor, post_id, kind).await?;

    Ok(Json(ToggleResponse { state }))
}

pub async fn toggle_like(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse>, AppError> {
    toggle(state, session, id, ReactionKind::Like).await
}

pub async fn toggle_repost(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse>, AppError> {
    toggle(state, session, id, ReactionKind::Repost).await
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

pub async fn add_comment(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let actor = require_actor(session)?;

    let service = EngagementService::new(state.store, state.invalidations);
    let comment = service.add_comment(&actor, id, payload.content).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ListResponse<Comment>>, AppError> {
    let (cursor, limit) = query.resolve()?;

    let service = EngagementService::new(state.store, state.invalidations);
    let comments = service.list_comments(id, cursor, limit + 1).await?;

    Ok(Json(into_page(comments, limit, |comment| {
        (comment.created_at, comment.id)
    })))
}

pub async fn list_notifications(
    Session(session): Session,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ListResponse<Notification>>, AppError> {
    let actor = require_actor(session)?;
    let (cursor, limit) = query.resolve()?;

    let service = NotificationService::new(state.store);
    let notifications = service.list(&actor, cursor, limit + 1).await?;

    Ok(Json(into_page(notifications, limit, |notification| {
        (notification.created_at, notification.id)
    })))
}

pub async fn mark_notification_read(
    Path(id): Path<Uuid>,
    Session(session): Session,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let actor = require_actor(session)?;

    let service = NotificationService::new(state.store);
    if service.mark_read(&actor, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("notification not found"))
    }
}
