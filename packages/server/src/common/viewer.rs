//! Request-scoped identity of the authenticated user.
//!
//! The session middleware resolves the `sessionid` cookie and stores a
//! [`Viewer`] in the request extensions. Handlers receive it explicitly as an
//! extractor argument; nothing reads authentication from ambient state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::entity_ids::UserId;
use super::error::AppError;

/// The authenticated user behind the current request.
#[derive(Clone, Debug)]
pub struct Viewer {
    pub user_id: UserId,
    pub username: String,
    /// Session token backing this viewer, used for logout and flash notices.
    pub session_token: String,
}

impl Viewer {
    /// The viewer's id in the `Option` shape the membership policy takes.
    pub fn id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Extractor: rejects with a redirect to the login form when the request
/// carries no valid session.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .cloned()
            .ok_or(AppError::AuthenticationRequired)
    }
}
