use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::app::session::Actor;
use crate::http::AppError;
use crate::AppState;

/// The acting user for this request, if any. Extraction never rejects for a
/// missing or invalid token; handlers decide whether a user is required.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub Option<Actor>);

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Ok(Session(None));
        };

        let actor = state.sessions.resolve(token).map_err(|err| {
            tracing::error!(error = ?err, "failed to resolve session");
            AppError::internal("failed to authenticate")
        })?;

        Ok(Session(actor))
    }
}
