use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Like,
    Repost,
    Comment,
}

impl NotificationType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "LIKE" => Some(Self::Like),
            "REPOST" => Some(Self::Repost),
            "COMMENT" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Repost => "REPOST",
            Self::Comment => "COMMENT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient, always the author of the related post.
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub content: String,
    pub related_id: Uuid,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub content: String,
    pub related_id: Uuid,
}

impl NewNotification {
    pub fn for_post(
        recipient_id: Uuid,
        actor_id: Uuid,
        post_id: Uuid,
        notification_type: NotificationType,
    ) -> Self {
        let content = match notification_type {
            NotificationType::Like => format!("{} liked your post", actor_id),
            NotificationType::Repost => format!("{} reposted your post", actor_id),
            NotificationType::Comment => format!("{} commented on your post", actor_id),
        };
        Self {
            user_id: recipient_id,
            notification_type,
            content,
            related_id: post_id,
        }
    }
}
