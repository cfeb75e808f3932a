use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::engagement::{Comment, NewComment, NewReaction, Reaction, ReactionKind};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::post::{NewPost, Post};
use crate::domain::user::User;

/// Keyset pagination position: `(created_at, id)` of the last item seen.
pub type Cursor = (OffsetDateTime, Uuid);

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write, the row to delete was
    /// already gone, or the database broke a lock cycle. Another writer got
    /// there first.
    #[error("conflicting concurrent write")]
    Conflict,

    #[error("referenced post does not exist")]
    PostMissing,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent store behind the engagement services.
///
/// Every method that writes a notification does so in the same transaction
/// as its primary write: either both rows land or neither does.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>>;

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;

    /// Deletes the post only if `author_id` owns it. Reactions, comments and
    /// notifications tied to the post go with it.
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> StoreResult<bool>;

    async fn find_reaction(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> StoreResult<Option<Reaction>>;

    /// Inserts the reaction, bumps the post's counter and records the
    /// notification atomically. Fails with [`StoreError::Conflict`] when the
    /// (author, post, kind) row already exists and with
    /// [`StoreError::PostMissing`] when the post is gone.
    async fn insert_reaction(
        &self,
        reaction: NewReaction,
        notification: NewNotification,
    ) -> StoreResult<Reaction>;

    /// Removes the reaction and decrements the counter. Returns `false` when
    /// the row no longer exists.
    async fn delete_reaction(&self, reaction: &Reaction) -> StoreResult<bool>;

    async fn insert_comment(
        &self,
        comment: NewComment,
        notification: NewNotification,
    ) -> StoreResult<Comment>;

    async fn latest_comment(&self, post_id: Uuid) -> StoreResult<Option<Comment>>;

    async fn list_comments(
        &self,
        post_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Comment>>;

    async fn list_notifications(
        &self,
        user_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Notification>>;

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<bool>;
}
