use std::sync::Arc;

use uuid::Uuid;

use crate::app::error::ServiceResult;
use crate::app::session::Actor;
use crate::app::store::{Cursor, EngagementStore};
use crate::domain::notification::Notification;

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn EngagementStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> ServiceResult<Vec<Notification>> {
        Ok(self
            .store
            .list_notifications(actor.user_id, cursor, limit)
            .await?)
    }

    pub async fn mark_read(&self, actor: &Actor, notification_id: Uuid) -> ServiceResult<bool> {
        Ok(self
            .store
            .mark_notification_read(notification_id, actor.user_id)
            .await?)
    }
}
