use anyhow::Result;
use redis::{AsyncCommands, Client};
use tracing::warn;
use uuid::Uuid;

use crate::app::invalidation::Invalidation;
use crate::domain::post::PostView;

#[derive(Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// Rendered post views keyed by route path. Without Redis every lookup
/// misses and the card is assembled from the store.
#[derive(Clone)]
pub struct ViewCache {
    redis: Option<RedisCache>,
    ttl_seconds: u64,
}

impl ViewCache {
    pub fn new(redis: Option<RedisCache>, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    pub fn disabled() -> Self {
        Self::new(None, 0)
    }

    pub async fn ping(&self) -> Result<()> {
        match &self.redis {
            Some(redis) => redis.ping().await,
            None => Ok(()),
        }
    }

    pub async fn get_post(&self, post_id: Uuid) -> Option<PostView> {
        let redis = self.redis.as_ref()?;
        let key = view_key(&Invalidation::Post(post_id).path());

        let mut conn = redis.client().get_multiplexed_async_connection().await.ok()?;
        let payload = conn.get::<_, Option<String>>(&key).await.ok()??;
        serde_json::from_str::<PostView>(&payload).ok()
    }

    pub async fn put_post(&self, view: &PostView) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let key = view_key(&Invalidation::Post(view.id).path());

        if let Ok(mut conn) = redis.client().get_multiplexed_async_connection().await {
            if let Ok(payload) = serde_json::to_string(view) {
                if let Err(err) = conn
                    .set_ex::<_, _, ()>(&key, payload, self.ttl_seconds)
                    .await
                {
                    warn!(error = ?err, key = %key, "failed to write view cache");
                }
            }
        }
    }

    pub async fn evict(&self, path: &str) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let key = view_key(path);

        match redis.client().get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(err) = conn.del::<_, ()>(&key).await {
                    warn!(error = ?err, key = %key, "failed to evict cached view");
                }
            }
            Err(err) => warn!(error = ?err, key = %key, "failed to reach view cache"),
        }
    }
}

fn view_key(path: &str) -> String {
    format!("view:{}", path)
}
