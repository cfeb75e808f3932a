pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::invalidation::InvalidationBus;
use crate::app::session::SessionService;
use crate::app::store::EngagementStore;
use crate::infra::cache::ViewCache;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EngagementStore>,
    pub views: ViewCache,
    pub invalidations: InvalidationBus,
    pub sessions: SessionService,
}
