//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Extension;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::server::auth::SessionStore;
use crate::server::middleware::session_auth_middleware;
use crate::server::routes::{accounts, communities, events, health};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub sessions: Arc<SessionStore>,
}

/// Build the Axum application router
pub fn build_app(pool: PgPool) -> Router {
    let sessions = Arc::new(SessionStore::new());

    // Sweep expired sessions in the background
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            sweeper.cleanup_expired().await;
        }
    });

    let app_state = AxumAppState {
        db_pool: pool,
        sessions: sessions.clone(),
    };

    Router::new()
        // Health check
        .route("/health", get(health::health_handler))
        // Authentication and profile
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route(
            "/register",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/logout", post(accounts::logout))
        .route("/", get(accounts::home))
        .route(
            "/profile",
            get(accounts::profile).post(accounts::update_profile),
        )
        // Events
        .route("/events", get(events::list))
        .route("/events/new", get(events::new_form).post(events::create))
        .route("/events/:id", get(events::detail))
        .route(
            "/events/:id/edit",
            get(events::edit_form).post(events::update),
        )
        .route("/events/:id/delete", post(events::delete))
        // Communities
        .route("/communities", get(communities::list))
        .route("/communities/search", get(communities::search))
        .route(
            "/communities/new",
            get(communities::new_form).post(communities::create),
        )
        .route("/communities/:id", get(communities::detail))
        .route("/communities/:id/delete", post(communities::delete))
        .route("/communities/:id/join", post(communities::join))
        .route("/communities/:id/leave", post(communities::leave))
        .route("/communities/:id/members", get(communities::members))
        // Create event within a community
        .route(
            "/communities/:id/events/new",
            get(events::new_in_community_form).post(events::create_in_community),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            session_auth_middleware(sessions.clone(), req, next)
        })) // Resolve the session cookie into a Viewer
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
}
