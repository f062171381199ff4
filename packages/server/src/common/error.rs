//! Application error taxonomy shared by all request handlers.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

/// Errors a request handler can surface.
///
/// Validation failures are not represented here: they re-render the
/// submission form with field errors and never abort the request.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for handler and model seams.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Unauthenticated browsers get bounced to the login form.
            AppError::AuthenticationRequired => Redirect::to("/login").into_response(),
            AppError::PermissionDenied(reason) => {
                (StatusCode::FORBIDDEN, error_page("Permission denied", &reason)).into_response()
            }
            AppError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                error_page("Not found", &format!("{entity} not found")),
            )
                .into_response(),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_page("Server error", "Something went wrong. Please try again."),
                )
                    .into_response()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_page("Server error", "Something went wrong. Please try again."),
                )
                    .into_response()
            }
        }
    }
}

fn error_page(title: &str, detail: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Back to EventWall</a></p></body></html>"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Event").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_permission_denied_maps_to_403() {
        let response = AppError::PermissionDenied("not the owner".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = AppError::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }
}
