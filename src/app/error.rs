use thiserror::Error;

use crate::app::store::StoreError;

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("not found")]
    NotFound,

    #[error("not allowed")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("conflicting concurrent update")]
    Conflict,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EngagementError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            StoreError::PostMissing => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, EngagementError>;
