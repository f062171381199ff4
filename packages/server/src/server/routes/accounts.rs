//! Authentication, home and profile handlers.

use axum::extract::{Extension, Form};
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};

use crate::common::forms::FieldErrors;
use crate::common::{AppResult, Viewer};
use crate::domains::accounts::forms::{LoginForm, ProfileForm, RegistrationForm};
use crate::domains::accounts::models::{Profile, User};
use crate::domains::accounts::password;
use crate::server::app::AxumAppState;
use crate::server::auth::{Flash, Session};
use crate::server::middleware::{clear_session_cookie_header, session_cookie_header};
use crate::server::views;

/// Log the user in and send them home with a fresh session cookie.
async fn start_session(state: &AxumAppState, user: &User) -> Response {
    let token = state
        .sessions
        .create_session(Session {
            user_id: user.id,
            username: user.username.clone(),
            created_at: chrono::Utc::now(),
        })
        .await;

    (
        AppendHeaders([(header::SET_COOKIE, session_cookie_header(&token))]),
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn home(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> Response {
    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    views::home_page(&viewer, &flashes).into_response()
}

pub async fn login_form(viewer: Option<Viewer>) -> Response {
    if viewer.is_some() {
        return Redirect::to("/").into_response();
    }
    views::login_page(&LoginForm::default(), &FieldErrors::new()).into_response()
}

pub async fn login(
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(views::login_page(&form, &errors).into_response());
    }

    let user = User::find_by_username(form.username.trim(), &state.db_pool).await?;
    let Some(user) = user else {
        return Ok(views::login_page(&form, &LoginForm::invalid_credentials()).into_response());
    };
    if !password::verify_password(&form.password, &user.password_hash) {
        return Ok(views::login_page(&form, &LoginForm::invalid_credentials()).into_response());
    }

    tracing::info!(username = %user.username, "User logged in");
    Ok(start_session(&state, &user).await)
}

pub async fn register_form(viewer: Option<Viewer>) -> Response {
    if viewer.is_some() {
        return Redirect::to("/").into_response();
    }
    views::register_page(&RegistrationForm::default(), &FieldErrors::new()).into_response()
}

pub async fn register(
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    let username = form.username.trim();
    // Uniqueness is also enforced by the database; this check just turns the
    // common case into a field error instead of a 500.
    if !errors.has("username") && User::username_taken(username, &state.db_pool).await? {
        errors.add("username", "A user with that username already exists.");
    }

    if !errors.is_empty() {
        return Ok(views::register_page(&form, &errors).into_response());
    }

    let password_hash = password::hash_password(&form.password1)?;
    let user = User::insert(username, form.email.trim(), &password_hash, &state.db_pool).await?;

    tracing::info!(username = %user.username, "User registered");
    Ok(start_session(&state, &user).await)
}

pub async fn logout(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> Response {
    state.sessions.delete_session(&viewer.session_token).await;
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie_header())]),
        Redirect::to("/login"),
    )
        .into_response()
}

pub async fn profile(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> AppResult<Response> {
    let profile = Profile::get_or_create(viewer.user_id, &state.db_pool).await?;
    let form = ProfileForm {
        bio: profile.bio.clone(),
        phone: profile.phone.clone(),
        photo_url: profile.photo_url.clone(),
    };
    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::profile_page(&viewer, &flashes, &profile, &form).into_response())
}

pub async fn update_profile(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    // get_or_create first: the row may not exist if the user posts without
    // ever viewing the profile page.
    Profile::get_or_create(viewer.user_id, &state.db_pool).await?;
    Profile::update(
        viewer.user_id,
        form.bio.trim(),
        form.phone.trim(),
        form.photo_url.trim(),
        &state.db_pool,
    )
    .await?;

    state
        .sessions
        .push_flash(&viewer.session_token, Flash::success("Profile updated."))
        .await;
    Ok(Redirect::to("/profile").into_response())
}
