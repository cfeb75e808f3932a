use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::user::AuthorSummary;

const COMMENT_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub repost_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}


#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub content: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
}

impl From<&Post> for PostCounts {
    fn from(post: &Post) -> Self {
        Self {
            likes: post.like_count,
            comments: post.comment_count,
            reposts: post.repost_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentPreview {
    pub id: Uuid,
    pub author: AuthorSummary,
    pub excerpt: String,
}

impl CommentPreview {
    pub fn new(id: Uuid, author: AuthorSummary, content: &str) -> Self {
        Self {
            id,
            author,
            excerpt: excerpt(content),
        }
    }
}

/// Viewer-independent part of a post card; this is what the view cache
/// stores. Counts are not part of it: they are read from the post row on
/// every card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: AuthorSummary,
    pub content: String,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub top_comment: Option<CommentPreview>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerState {
    pub is_liked: bool,
    pub is_reposted: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    #[serde(flatten)]
    pub view: PostView,
    pub counts: PostCounts,
    pub created_label: String,
    pub viewer: ViewerState,
}

fn excerpt(content: &str) -> String {
    match content.char_indices().nth(COMMENT_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
