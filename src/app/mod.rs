pub mod engagement;
pub mod error;
pub mod format;
pub mod invalidation;
pub mod notifications;
pub mod posts;
pub mod session;
pub mod store;
