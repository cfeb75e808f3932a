use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::store::{Cursor, EngagementStore, StoreError, StoreResult};
use crate::domain::engagement::{Comment, NewComment, NewReaction, Reaction, ReactionKind};
use crate::domain::notification::{NewNotification, Notification, NotificationType};
use crate::domain::post::{NewPost, Post};
use crate::domain::user::User;
use crate::infra::db::Db;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const DEADLOCK_DETECTED: &str = "40P01";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) | Some(DEADLOCK_DETECTED) => return StoreError::Conflict,
                Some(FOREIGN_KEY_VIOLATION) => {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.ends_with("post_id_fkey")
                        || constraint == "notifications_related_id_fkey"
                    {
                        return StoreError::PostMissing;
                    }
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

fn reaction_table(kind: ReactionKind) -> &'static str {
    match kind {
        ReactionKind::Like => "likes",
        ReactionKind::Repost => "reposts",
    }
}

fn counter_column(kind: ReactionKind) -> &'static str {
    match kind {
        ReactionKind::Like => "like_count",
        ReactionKind::Repost => "repost_count",
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        image: row.get("image"),
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
        repost_count: row.get("repost_count"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

fn notification_from_row(row: &PgRow) -> StoreResult<Notification> {
    let notification_type: String = row.get("notification_type");
    let notification_type = NotificationType::from_db(&notification_type).ok_or_else(|| {
        StoreError::Database(sqlx::Error::Decode(
            format!("unknown notification type: {}", notification_type).into(),
        ))
    })?;

    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        notification_type,
        content: row.get("content"),
        related_id: row.get("related_id"),
        read_at: row.get("read_at"),
        created_at: row.get("created_at"),
    })
}

async fn insert_notification(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    notification: &NewNotification,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO notifications (user_id, notification_type, content, related_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(notification.user_id)
    .bind(notification.notification_type.as_db())
    .bind(&notification.content)
    .bind(notification.related_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl EngagementStore for Db {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, username, image FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            username: row.get("username"),
            image: row.get("image"),
        }))
    }

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, author_id, content, image, like_count, comment_count, repost_count, created_at \
             FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (author_id, content, image) VALUES ($1, $2, $3) \
             RETURNING id, author_id, content, image, like_count, comment_count, repost_count, created_at",
        )
        .bind(post.author_id)
        .bind(post.content)
        .bind(post.image)
        .fetch_one(self.pool())
        .await?;

        Ok(post_from_row(&row))
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_reaction(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> StoreResult<Option<Reaction>> {
        let sql = format!(
            "SELECT id, author_id, post_id, created_at FROM {} \
             WHERE author_id = $1 AND post_id = $2",
            reaction_table(kind)
        );
        let row = sqlx::query(&sql)
            .bind(author_id)
            .bind(post_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|row| Reaction {
            id: row.get("id"),
            author_id: row.get("author_id"),
            post_id: row.get("post_id"),
            kind,
            created_at: row.get("created_at"),
        }))
    }

    async fn insert_reaction(
        &self,
        reaction: NewReaction,
        notification: NewNotification,
    ) -> StoreResult<Reaction> {
        let mut tx = self.pool().begin().await?;

        // Locks the post row: concurrent toggles on the same post queue here
        // and the loser meets the unique constraint below.
        let bump = format!(
            "UPDATE posts SET {column} = {column} + 1 WHERE id = $1",
            column = counter_column(reaction.kind)
        );
        let bumped = sqlx::query(&bump)
            .bind(reaction.post_id)
            .execute(&mut *tx)
            .await?;
        if bumped.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::PostMissing);
        }

        let insert = format!(
            "INSERT INTO {} (author_id, post_id) VALUES ($1, $2) \
             RETURNING id, author_id, post_id, created_at",
            reaction_table(reaction.kind)
        );
        let row = sqlx::query(&insert)
            .bind(reaction.author_id)
            .bind(reaction.post_id)
            .fetch_one(&mut *tx)
            .await?;

        insert_notification(&mut tx, &notification).await?;
        tx.commit().await?;

        Ok(Reaction {
            id: row.get("id"),
            author_id: row.get("author_id"),
            post_id: row.get("post_id"),
            kind: reaction.kind,
            created_at: row.get("created_at"),
        })
    }

    async fn delete_reaction(&self, reaction: &Reaction) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        // Post row first, the same order as inserts and the post delete
        // cascade. A missing post means the reaction went with it.
        let decrement = format!(
            "UPDATE posts SET {column} = GREATEST({column} - 1, 0) WHERE id = $1",
            column = counter_column(reaction.kind)
        );
        let locked = sqlx::query(&decrement)
            .bind(reaction.post_id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let delete = format!("DELETE FROM {} WHERE id = $1", reaction_table(reaction.kind));
        let deleted = sqlx::query(&delete)
            .bind(reaction.id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_comment(
        &self,
        comment: NewComment,
        notification: NewNotification,
    ) -> StoreResult<Comment> {
        let mut tx = self.pool().begin().await?;

        let bumped = sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(comment.post_id)
            .execute(&mut *tx)
            .await?;
        if bumped.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::PostMissing);
        }

        let row = sqlx::query(
            "INSERT INTO comments (post_id, author_id, content) VALUES ($1, $2, $3) \
             RETURNING id, post_id, author_id, content, created_at",
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.content)
        .fetch_one(&mut *tx)
        .await?;

        insert_notification(&mut tx, &notification).await?;
        tx.commit().await?;

        Ok(comment_from_row(&row))
    }

    async fn latest_comment(&self, post_id: Uuid) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, post_id, author_id, content, created_at \
             FROM comments \
             WHERE post_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1",
        )
        .bind(post_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    async fn list_comments(
        &self,
        post_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Comment>> {
        let rows = match cursor {
            Some((created_at, comment_id)) => {
                sqlx::query(
                    "SELECT id, post_id, author_id, content, created_at \
                     FROM comments \
                     WHERE post_id = $1 \
                       AND (created_at < $2 OR (created_at = $2 AND id < $3)) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $4",
                )
                .bind(post_id)
                .bind(created_at)
                .bind(comment_id)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, post_id, author_id, content, created_at \
                     FROM comments \
                     WHERE post_id = $1 \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $2",
                )
                .bind(post_id)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let rows = match cursor {
            Some((created_at, notification_id)) => {
                sqlx::query(
                    "SELECT id, user_id, notification_type, content, related_id, read_at, created_at \
                     FROM notifications \
                     WHERE user_id = $1 \
                       AND (created_at < $2 OR (created_at = $2 AND id < $3)) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $4",
                )
                .bind(user_id)
                .bind(created_at)
                .bind(notification_id)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, user_id, notification_type, content, related_id, read_at, created_at \
                     FROM notifications \
                     WHERE user_id = $1 \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $2",
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
        };

        rows.iter().map(notification_from_row).collect()
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read_at = now() \
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
