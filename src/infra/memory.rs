use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::store::{Cursor, EngagementStore, StoreError, StoreResult};
use crate::domain::engagement::{Comment, NewComment, NewReaction, Reaction, ReactionKind};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::post::{NewPost, Post};
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    reactions: Vec<Reaction>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn counter_mut(&mut self, post_id: Uuid, kind: ReactionKind) -> Option<&mut i64> {
        let post = self.posts.get_mut(&post_id)?;
        Some(match kind {
            ReactionKind::Like => &mut post.like_count,
            ReactionKind::Repost => &mut post.repost_count,
        })
    }

    fn push_notification(&mut self, notification: NewNotification, now: OffsetDateTime) {
        self.notifications.push(Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            notification_type: notification.notification_type,
            content: notification.content,
            related_id: notification.related_id,
            read_at: None,
            created_at: now,
        });
    }
}

/// Single-process store. One mutex guards every table, so each trait call is
/// a serializable transaction and the uniqueness rules match the Postgres
/// schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users are owned by the identity provider; this seeds one locally.
    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    pub fn reaction_rows(&self, post_id: Uuid, kind: ReactionKind) -> usize {
        self.lock()
            .reactions
            .iter()
            .filter(|reaction| reaction.post_id == post_id && reaction.kind == kind)
            .count()
    }

    pub fn notifications_for_post(&self, post_id: Uuid) -> Vec<Notification> {
        self.lock()
            .notifications
            .iter()
            .filter(|notification| notification.related_id == post_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // Mutations validate before writing, so a poisoned lock still guards
        // consistent tables.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn page<T, F>(mut items: Vec<T>, cursor: Option<Cursor>, limit: i64, key: F) -> Vec<T>
where
    F: Fn(&T) -> Cursor,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
        .into_iter()
        .filter(|item| cursor.map_or(true, |cursor| key(item) < cursor))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect()
}

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.lock().posts.get(&post_id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            content: post.content,
            image: post.image,
            like_count: 0,
            comment_count: 0,
            repost_count: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        self.lock().posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.lock();
        match tables.posts.get(&post_id) {
            Some(post) if post.author_id == author_id => {}
            _ => return Ok(false),
        }

        tables.posts.remove(&post_id);
        tables.reactions.retain(|reaction| reaction.post_id != post_id);
        tables.comments.retain(|comment| comment.post_id != post_id);
        tables
            .notifications
            .retain(|notification| notification.related_id != post_id);
        Ok(true)
    }

    async fn find_reaction(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> StoreResult<Option<Reaction>> {
        Ok(self
            .lock()
            .reactions
            .iter()
            .find(|reaction| {
                reaction.author_id == author_id && reaction.post_id == post_id && reaction.kind == kind
            })
            .cloned())
    }

    async fn insert_reaction(
        &self,
        reaction: NewReaction,
        notification: NewNotification,
    ) -> StoreResult<Reaction> {
        let mut tables = self.lock();
        if !tables.posts.contains_key(&reaction.post_id) {
            return Err(StoreError::PostMissing);
        }
        let duplicate = tables.reactions.iter().any(|existing| {
            existing.author_id == reaction.author_id
                && existing.post_id == reaction.post_id
                && existing.kind == reaction.kind
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        let now = OffsetDateTime::now_utc();
        let row = Reaction {
            id: Uuid::new_v4(),
            author_id: reaction.author_id,
            post_id: reaction.post_id,
            kind: reaction.kind,
            created_at: now,
        };
        if let Some(counter) = tables.counter_mut(reaction.post_id, reaction.kind) {
            *counter += 1;
        }
        tables.reactions.push(row.clone());
        tables.push_notification(notification, now);

        Ok(row)
    }

    async fn delete_reaction(&self, reaction: &Reaction) -> StoreResult<bool> {
        let mut tables = self.lock();
        let Some(index) = tables
            .reactions
            .iter()
            .position(|existing| existing.id == reaction.id)
        else {
            return Ok(false);
        };

        tables.reactions.remove(index);
        if let Some(counter) = tables.counter_mut(reaction.post_id, reaction.kind) {
            *counter = (*counter - 1).max(0);
        }
        Ok(true)
    }

    async fn insert_comment(
        &self,
        comment: NewComment,
        notification: NewNotification,
    ) -> StoreResult<Comment> {
        let mut tables = self.lock();
        let now = OffsetDateTime::now_utc();
        let Some(post) = tables.posts.get_mut(&comment.post_id) else {
            return Err(StoreError::PostMissing);
        };
        post.comment_count += 1;

        let row = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: now,
        };
        tables.comments.push(row.clone());
        tables.push_notification(notification, now);

        Ok(row)
    }

    async fn latest_comment(&self, post_id: Uuid) -> StoreResult<Option<Comment>> {
        // Insertion order breaks timestamp ties.
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .max_by_key(|comment| comment.created_at)
            .cloned())
    }

    async fn list_comments(
        &self,
        post_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Comment>> {
        let comments = self
            .lock()
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        Ok(page(comments, cursor, limit, |comment| {
            (comment.created_at, comment.id)
        }))
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let notifications = self
            .lock()
            .notifications
            .iter()
            .filter(|notification| notification.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(notifications, cursor, limit, |notification| {
            (notification.created_at, notification.id)
        }))
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<bool> {
        let mut tables = self.lock();
        let unread = tables.notifications.iter_mut().find(|notification| {
            notification.id == notification_id
                && notification.user_id == user_id
                && notification.read_at.is_none()
        });

        match unread {
            Some(notification) => {
                notification.read_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
