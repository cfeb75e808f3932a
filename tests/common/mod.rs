#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;
use uuid::Uuid;

use murmur::app::invalidation::{self, Invalidation, InvalidationBus};
use murmur::app::session::{Actor, SessionService};
use murmur::app::store::EngagementStore;
use murmur::domain::post::{NewPost, Post};
use murmur::domain::user::User;
use murmur::infra::cache::{RedisCache, ViewCache};
use murmur::infra::memory::MemoryStore;
use murmur::AppState;

// "0123456789abcdef0123456789abcdef" (test-only key)
pub const TEST_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

// ---------------------------------------------------------------------------
// TestApp: one isolated in-process store per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub memory: Arc<MemoryStore>,
    events: broadcast::Receiver<Invalidation>,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub access_token: String,
}

impl TestUser {
    pub fn actor(&self) -> Actor {
        Actor { user_id: self.id }
    }
}

impl TestApp {
    pub fn new() -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self::build(memory.clone(), memory, ViewCache::disabled())
    }

    /// Routes store calls through `store` while seeding and assertions still
    /// go to `memory`. Used to wrap the memory store with fault injection.
    pub fn with_store(store: Arc<dyn EngagementStore>, memory: Arc<MemoryStore>) -> Self {
        Self::build(store, memory, ViewCache::disabled())
    }

    /// Caches post views in Redis and runs the eviction consumer, as
    /// `main` does. Returns `None` when TEST_REDIS_URL is unset.
    pub async fn with_redis_views() -> Option<Self> {
        let Ok(redis_url) = std::env::var("TEST_REDIS_URL") else {
            eprintln!("TEST_REDIS_URL not set, skipping");
            return None;
        };
        let cache = RedisCache::connect(&redis_url)
            .await
            .expect("Redis connect failed");

        let memory = Arc::new(MemoryStore::new());
        let app = Self::build(memory.clone(), memory, ViewCache::new(Some(cache), 60));
        tokio::spawn(invalidation::run_consumer(
            app.state.invalidations.subscribe(),
            app.state.views.clone(),
        ));
        Some(app)
    }

    fn build(store: Arc<dyn EngagementStore>, memory: Arc<MemoryStore>, views: ViewCache) -> Self {
        let invalidations = InvalidationBus::new(64);
        let events = invalidations.subscribe();

        let state = AppState {
            store,
            views,
            invalidations,
            sessions: SessionService::new(TEST_ACCESS_KEY, 15),
        };
        let router = murmur::http::router(state.clone());

        TestApp {
            router,
            state,
            memory,
            events,
        }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, None, token).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, None, token).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, None, token).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Seed a user in the store and issue an access token for it.
    pub fn create_user(&self, name: &str) -> TestUser {
        let id = Uuid::new_v4();
        self.memory.insert_user(User {
            id,
            name: name.to_string(),
            username: Some(format!("{}_handle", name)),
            image: None,
        });
        let access_token = self
            .state
            .sessions
            .issue_access_token(id)
            .expect("issue_access_token failed");

        TestUser {
            id,
            name: name.to_string(),
            access_token,
        }
    }

    /// Insert a post directly in the store. Returns the post id.
    pub async fn create_post_for_user(&self, author_id: Uuid) -> Uuid {
        self.memory
            .insert_post(NewPost {
                author_id,
                content: "test post".to_string(),
                image: None,
            })
            .await
            .expect("insert test post failed")
            .id
    }

    pub async fn post_row(&self, post_id: Uuid) -> Post {
        self.memory
            .find_post(post_id)
            .await
            .expect("find_post failed")
            .expect("post exists")
    }

    pub async fn like_count(&self, post_id: Uuid) -> i64 {
        self.post_row(post_id).await.like_count
    }

    /// Invalidation events published since the last call.
    pub fn drain_invalidations(&mut self) -> Vec<Invalidation> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
