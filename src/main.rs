use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur::app::invalidation::{self, InvalidationBus};
use murmur::app::session::SessionService;
use murmur::app::store::EngagementStore;
use murmur::config::{AppConfig, StoreBackend};
use murmur::http;
use murmur::infra::{cache::RedisCache, cache::ViewCache, db::Db, memory::MemoryStore};
use murmur::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn EngagementStore> = match config.store_backend {
        StoreBackend::Postgres => Arc::new(Db::connect(&config).await?),
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let cache = match &config.redis_url {
        Some(url) => Some(RedisCache::connect(url).await?),
        None => {
            tracing::info!("REDIS_URL not set, post views are not cached");
            None
        }
    };
    let views = ViewCache::new(cache, config.view_cache_ttl_seconds);

    let invalidations = InvalidationBus::new(config.invalidation_buffer);
    tokio::spawn(invalidation::run_consumer(
        invalidations.subscribe(),
        views.clone(),
    ));

    let state = AppState {
        store,
        views,
        invalidations,
        sessions: SessionService::new(config.paseto_access_key, config.access_ttl_minutes),
    };

    let app: Router = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
