use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::app::error::{EngagementError, ServiceResult};
use crate::app::invalidation::{Invalidation, InvalidationBus};
use crate::app::session::Actor;
use crate::app::store::{Cursor, EngagementStore};
use crate::domain::engagement::{Comment, NewComment, NewReaction, ReactionKind, ToggleState};
use crate::domain::notification::{NewNotification, NotificationType};

pub const MAX_COMMENT_CHARS: usize = 280;

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn EngagementStore>,
    invalidations: InvalidationBus,
}

impl EngagementService {
    pub fn new(store: Arc<dyn EngagementStore>, invalidations: InvalidationBus) -> Self {
        Self {
            store,
            invalidations,
        }
    }

    /// Flips the actor's reaction of `kind` on the post. Adding records a
    /// notification for the post author; removing never does.
    pub async fn toggle_reaction(
        &self,
        actor: &Actor,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> ServiceResult<ToggleState> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(EngagementError::NotFound);
        }

        let state = match self.try_toggle(actor, post_id, kind).await {
            Err(EngagementError::Conflict) => {
                debug!(
                    user_id = %actor.user_id,
                    post_id = %post_id,
                    kind = kind.as_db(),
                    "toggle lost a race, retrying against the current state"
                );
                self.try_toggle(actor, post_id, kind).await?
            }
            result => result?,
        };

        info!(
            user_id = %actor.user_id,
            post_id = %post_id,
            kind = kind.as_db(),
            state = ?state,
            "reaction toggled"
        );
        self.invalidations.publish(Invalidation::Post(post_id));

        Ok(state)
    }

    async fn try_toggle(
        &self,
        actor: &Actor,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> ServiceResult<ToggleState> {
        let existing = self
            .store
            .find_reaction(actor.user_id, post_id, kind)
            .await?;

        if let Some(reaction) = existing {
            return if self.store.delete_reaction(&reaction).await? {
                Ok(ToggleState::Removed)
            } else {
                Err(EngagementError::Conflict)
            };
        }

        // The post may have been deleted since the caller's lookup.
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or(EngagementError::NotFound)?;

        let notification = NewNotification::for_post(
            post.author_id,
            actor.user_id,
            post.id,
            kind.notification_type(),
        );
        self.store
            .insert_reaction(
                NewReaction {
                    author_id: actor.user_id,
                    post_id: post.id,
                    kind,
                },
                notification,
            )
            .await?;

        Ok(ToggleState::Added)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        content: String,
    ) -> ServiceResult<Comment> {
        validate_comment(&content)?;

        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or(EngagementError::NotFound)?;

        let notification = NewNotification::for_post(
            post.author_id,
            actor.user_id,
            post.id,
            NotificationType::Comment,
        );
        let comment = self
            .store
            .insert_comment(
                NewComment {
                    post_id: post.id,
                    author_id: actor.user_id,
                    content,
                },
                notification,
            )
            .await?;

        info!(
            user_id = %actor.user_id,
            post_id = %post_id,
            comment_id = %comment.id,
            "comment added"
        );
        self.invalidations.publish(Invalidation::Post(post_id));

        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        post_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> ServiceResult<Vec<Comment>> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(EngagementError::NotFound);
        }
        Ok(self.store.list_comments(post_id, cursor, limit).await?)
    }
}

fn validate_comment(content: &str) -> ServiceResult<()> {
    let length = content.chars().count();
    if length == 0 {
        return Err(EngagementError::Validation(
            "comment content cannot be empty".to_string(),
        ));
    }
    if length > MAX_COMMENT_CHARS {
        return Err(EngagementError::Validation(format!(
            "comment content exceeds {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(())
}
