//! Community CRUD, membership and search handlers.

use axum::extract::{Extension, Form, Path, Query};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::collections::HashSet;

use crate::common::forms::FieldErrors;
use crate::common::{AppError, AppResult, CommunityId, Viewer};
use crate::domains::communities::forms::CommunityForm;
use crate::domains::communities::{Community, Membership};
use crate::domains::events::Event;
use crate::server::app::AxumAppState;
use crate::server::auth::Flash;
use crate::server::views;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Pair each community with whether the viewer appears in its member set.
fn annotate(
    communities: Vec<Community>,
    joined: &HashSet<CommunityId>,
) -> Vec<(Community, bool)> {
    communities
        .into_iter()
        .map(|community| {
            let is_member = joined.contains(&community.id);
            (community, is_member)
        })
        .collect()
}

/// Two-bucket listing: communities you own, and (when searching) matches
/// you don't own.
pub async fn list(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let query = params.q.trim();

    let yours = Community::owned_by(viewer.user_id, &state.db_pool).await?;
    let results = if query.is_empty() {
        Vec::new()
    } else {
        Community::search(query, viewer.user_id, &state.db_pool).await?
    };

    let joined = Community::joined_ids(viewer.user_id, &state.db_pool).await?;
    let yours = annotate(yours, &joined);
    let results = annotate(results, &joined);

    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::communities_page(&viewer, &flashes, &yours, query, &results).into_response())
}

/// Standalone search view with the same bucket semantics as the listing.
pub async fn search(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let query = params.q.trim();
    let results = if query.is_empty() {
        Vec::new()
    } else {
        Community::search(query, viewer.user_id, &state.db_pool).await?
    };

    let joined = Community::joined_ids(viewer.user_id, &state.db_pool).await?;
    let results = annotate(results, &joined);

    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::community_search_page(&viewer, &flashes, query, &results).into_response())
}

pub async fn new_form(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> Response {
    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    views::community_form_page(&viewer, &flashes, &CommunityForm::default(), &FieldErrors::new())
        .into_response()
}

pub async fn create(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<CommunityForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        let flashes = state.sessions.take_flashes(&viewer.session_token).await;
        return Ok(views::community_form_page(&viewer, &flashes, &form, &errors).into_response());
    }

    Community::create(
        form.name.trim(),
        form.description.trim(),
        viewer.user_id,
        &state.db_pool,
    )
    .await?;

    state
        .sessions
        .push_flash(&viewer.session_token, Flash::success("Community created."))
        .await;
    Ok(Redirect::to("/communities").into_response())
}

pub async fn detail(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;
    let membership = Membership::load(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;
    let events = Event::find_for_community(community_id, &state.db_pool).await?;

    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::community_detail_page(
        &viewer,
        &flashes,
        &community,
        &events,
        membership.is_member(viewer.id()),
        membership.is_owner(viewer.id()),
    )
    .into_response())
}

pub async fn delete(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;

    if community.owner_id != viewer.user_id {
        state
            .sessions
            .push_flash(
                &viewer.session_token,
                Flash::error("Only the owner can delete this community."),
            )
            .await;
        return Ok(Redirect::to(&format!("/communities/{community_id}")).into_response());
    }

    // Events scoped to the community go with it.
    Community::delete(community_id, &state.db_pool).await?;
    state
        .sessions
        .push_flash(
            &viewer.session_token,
            Flash::success("The community was deleted."),
        )
        .await;
    Ok(Redirect::to("/communities").into_response())
}

pub async fn join(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;

    if community.owner_id == viewer.user_id {
        state
            .sessions
            .push_flash(
                &viewer.session_token,
                Flash::info("You are the owner of this community."),
            )
            .await;
    } else {
        Community::add_member(community_id, viewer.user_id, &state.db_pool).await?;
        state
            .sessions
            .push_flash(
                &viewer.session_token,
                Flash::success(format!("You joined {}.", community.name)),
            )
            .await;
    }

    Ok(Redirect::to(&format!("/communities/{community_id}")).into_response())
}

pub async fn leave(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;

    // Idempotent: leaving a community you never joined is a no-op.
    Community::remove_member(community_id, viewer.user_id, &state.db_pool).await?;
    state
        .sessions
        .push_flash(
            &viewer.session_token,
            Flash::success(format!("You left {}.", community.name)),
        )
        .await;

    Ok(Redirect::to(&format!("/communities/{community_id}")).into_response())
}

pub async fn members(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;
    let members = Community::members(community_id, &state.db_pool).await?;

    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::community_members_page(&viewer, &flashes, &community, &members).into_response())
}
