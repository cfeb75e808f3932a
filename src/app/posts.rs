use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::app::error::{EngagementError, ServiceResult};
use crate::app::format::format_post_date;
use crate::app::invalidation::{Invalidation, InvalidationBus};
use crate::app::session::Actor;
use crate::app::store::EngagementStore;
use crate::domain::engagement::ReactionKind;
use crate::domain::post::{
    CommentPreview, NewPost, Post, PostCard, PostCounts, PostView, ViewerState,
};
use crate::domain::user::AuthorSummary;
use crate::infra::cache::ViewCache;

pub const MAX_POST_CHARS: usize = 280;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn EngagementStore>,
    invalidations: InvalidationBus,
    views: ViewCache,
}

impl PostService {
    pub fn new(
        store: Arc<dyn EngagementStore>,
        invalidations: InvalidationBus,
        views: ViewCache,
    ) -> Self {
        Self {
            store,
            invalidations,
            views,
        }
    }

    pub async fn create_post(
        &self,
        actor: &Actor,
        content: String,
        image: Option<String>,
    ) -> ServiceResult<Post> {
        let length = content.chars().count();
        if length == 0 || length > MAX_POST_CHARS {
            return Err(EngagementError::Validation(format!(
                "post content must be between 1 and {} characters",
                MAX_POST_CHARS
            )));
        }

        let post = self
            .store
            .insert_post(NewPost {
                author_id: actor.user_id,
                content,
                image: image.filter(|url| !url.trim().is_empty()),
            })
            .await?;

        info!(user_id = %actor.user_id, post_id = %post.id, "post created");
        self.invalidations.publish(Invalidation::Feed);

        Ok(post)
    }

    /// Hard-deletes a post owned by the actor.
    pub async fn delete_post(&self, actor: &Actor, post_id: Uuid) -> ServiceResult<()> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or(EngagementError::NotFound)?;

        if post.author_id != actor.user_id {
            return Err(EngagementError::Forbidden);
        }

        // Guarded by author again in case ownership checks race a delete.
        if !self.store.delete_post(post_id, actor.user_id).await? {
            return Err(EngagementError::NotFound);
        }

        info!(user_id = %actor.user_id, post_id = %post_id, "post deleted");
        self.invalidations.publish(Invalidation::Post(post_id));
        self.invalidations.publish(Invalidation::Feed);

        Ok(())
    }

    pub async fn post_card(
        &self,
        viewer: Option<&Actor>,
        post_id: Uuid,
        now: OffsetDateTime,
    ) -> ServiceResult<PostCard> {
        // Existence and counts always come from the store; a cached view
        // only saves the author and comment lookups.
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or(EngagementError::NotFound)?;

        let view = match self.views.get_post(post_id).await {
            Some(view) => view,
            None => {
                let view = self.load_view(&post).await?;
                self.views.put_post(&view).await;
                view
            }
        };

        let viewer = match viewer {
            Some(actor) => ViewerState {
                is_liked: self.has_reacted(actor, post_id, ReactionKind::Like).await?,
                is_reposted: self.has_reacted(actor, post_id, ReactionKind::Repost).await?,
                can_delete: actor.user_id == view.author.id,
            },
            None => ViewerState::default(),
        };

        Ok(PostCard {
            counts: PostCounts::from(&post),
            created_label: format_post_date(view.created_at, now),
            view,
            viewer,
        })
    }

    async fn load_view(&self, post: &Post) -> ServiceResult<PostView> {
        let author = self
            .store
            .find_user(post.author_id)
            .await?
            .ok_or(EngagementError::NotFound)?;

        let top_comment = match self.store.latest_comment(post.id).await? {
            Some(comment) => self
                .store
                .find_user(comment.author_id)
                .await?
                .map(|user| CommentPreview::new(comment.id, user.into(), &comment.content)),
            None => None,
        };

        Ok(PostView {
            id: post.id,
            author: AuthorSummary::from(author),
            content: post.content.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
            top_comment,
        })
    }

    async fn has_reacted(
        &self,
        actor: &Actor,
        post_id: Uuid,
        kind: ReactionKind,
    ) -> ServiceResult<bool> {
        Ok(self
            .store
            .find_reaction(actor.user_id, post_id, kind)
            .await?
            .is_some())
    }
}
