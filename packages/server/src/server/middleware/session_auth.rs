use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::common::Viewer;
use crate::server::auth::{SessionStore, SESSION_COOKIE};

/// Middleware to resolve the session cookie into a [`Viewer`]
///
/// This middleware:
/// 1. Extracts the session token from the `sessionid` cookie
/// 2. Looks up the session in the SessionStore
/// 3. Stores a `Viewer` in the request extensions
///
/// Note: it does NOT block requests - it only extracts auth info. Handlers
/// that need an authenticated user take `Viewer` as an extractor, whose
/// rejection redirects to the login form.
pub async fn session_auth_middleware(
    sessions: Arc<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(viewer) = extract_viewer(request.headers(), sessions.as_ref()).await {
        request.extensions_mut().insert(viewer);
    }

    next.run(request).await
}

/// Extract and verify the viewer behind the request's session cookie
async fn extract_viewer(headers: &HeaderMap, sessions: &SessionStore) -> Option<Viewer> {
    let token = session_cookie(headers)?;
    let session = sessions.get_session(&token).await?;

    Some(Viewer {
        user_id: session.user_id,
        username: session.username,
        session_token: token,
    })
}

/// Pull the session token out of the Cookie header, if present.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let parts: Vec<&str> = cookie.trim().splitn(2, '=').collect();
        if parts.len() == 2 && parts[0] == SESSION_COOKIE {
            return Some(parts[1].to_string());
        }
    }
    None
}

/// Build the Set-Cookie value that establishes a session.
pub fn session_cookie_header(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Build the Set-Cookie value that clears the session cookie on logout.
pub fn clear_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_found_among_others() {
        let headers = headers_with_cookie("theme=dark; sessionid=abc-123; lang=en");
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_missing_session_cookie() {
        let headers = headers_with_cookie("theme=dark");
        assert!(session_cookie(&headers).is_none());

        assert!(session_cookie(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_set_cookie_round_trip() {
        let set = session_cookie_header("tok-1");
        let headers = headers_with_cookie(set.split(';').next().unwrap());
        assert_eq!(session_cookie(&headers).as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        assert!(clear_session_cookie_header().contains("Max-Age=0"));
    }
}
