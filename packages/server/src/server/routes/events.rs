//! Event CRUD handlers.
//!
//! Each handler performs at most one membership decision and one
//! persistence operation; everything else is form plumbing.

use axum::extract::{Extension, Form, Path};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Local;

use crate::common::forms::FieldErrors;
use crate::common::{AppError, AppResult, CommunityId, EventId, UserId, Viewer};
use crate::domains::communities::{Community, Membership};
use crate::domains::events::{Event, EventSubmission};
use crate::server::app::AxumAppState;
use crate::server::auth::Flash;
use crate::server::views;

pub async fn list(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> AppResult<Response> {
    let events = Event::find_all(&state.db_pool).await?;
    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::events_list_page(&viewer, &flashes, &events).into_response())
}

pub async fn detail(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(event_id): Path<EventId>,
) -> AppResult<Response> {
    let event = Event::find_by_id(event_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Event"))?;
    let community = match event.community_id {
        Some(community_id) => Community::find_by_id(community_id, &state.db_pool).await?,
        None => None,
    };
    let can_delete = may_delete(&event, community.as_ref().map(|c| c.owner_id), &viewer);

    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(
        views::event_detail_page(&viewer, &flashes, &event, community.as_ref(), can_delete)
            .into_response(),
    )
}

/// Render the event form with the viewer's posting choices.
async fn render_form(
    viewer: &Viewer,
    state: &AxumAppState,
    heading: &str,
    action: &str,
    form: &EventSubmission,
    errors: &FieldErrors,
    locked: Option<&Community>,
) -> AppResult<Response> {
    let communities = Community::postable_by(viewer.user_id, &state.db_pool).await?;
    let flashes = state.sessions.take_flashes(&viewer.session_token).await;
    Ok(views::event_form_page(
        viewer,
        &flashes,
        heading,
        action,
        form,
        errors,
        &communities,
        locked,
    )
    .into_response())
}

pub async fn new_form(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
) -> AppResult<Response> {
    render_form(
        &viewer,
        &state,
        "New event",
        "/events/new",
        &EventSubmission::default(),
        &FieldErrors::new(),
        None,
    )
    .await
}

pub async fn create(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<EventSubmission>,
) -> AppResult<Response> {
    create_event(viewer, state, form, None).await
}

/// GET form for posting an event into a specific community.
pub async fn new_in_community_form(
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

    if !membership.is_member(viewer.id()) {
        state
            .sessions
            .push_flash(
                &viewer.session_token,
                Flash::error("You do not have permission to create events in this community."),
            )
            .await;
        return Ok(Redirect::to(&format!("/communities/{community_id}")).into_response());
    }

    let form = EventSubmission {
        community: community_id.to_string(),
        ..Default::default()
    };
    let heading = format!("New event in {}", community.name);
    let action = format!("/communities/{community_id}/events/new");
    render_form(
        &viewer,
        &state,
        &heading,
        &action,
        &form,
        &FieldErrors::new(),
        Some(&community),
    )
    .await
}

pub async fn create_in_community(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(community_id): Path<CommunityId>,
    Form(mut form): Form<EventSubmission>,
) -> AppResult<Response> {
    let community = Community::find_by_id(community_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Community"))?;
    // The path is authoritative for community-scoped creation.
    form.community = community_id.to_string();
    create_event(viewer, state, form, Some(community)).await
}

/// Shared create flow: validate, gate on membership, persist, redirect.
async fn create_event(
    viewer: Viewer,
    state: AxumAppState,
    form: EventSubmission,
    locked: Option<Community>,
) -> AppResult<Response> {
    let (heading, action) = match &locked {
        Some(community) => (
            format!("New event in {}", community.name),
            format!("/communities/{}/events/new", community.id),
        ),
        None => ("New event".to_string(), "/events/new".to_string()),
    };

    let today = Local::now().date_naive();
    let validated = match form.validate(today) {
        Ok(validated) => validated,
        Err(errors) => {
            return render_form(
                &viewer,
                &state,
                &heading,
                &action,
                &form,
                &errors,
                locked.as_ref(),
            )
            .await;
        }
    };

    if let Some(community_id) = validated.community_id {
        let membership = Membership::load(community_id, &state.db_pool)
            .await?
            .ok_or(AppError::NotFound("Community"))?;
        if !membership.is_member(viewer.id()) {
            state
                .sessions
                .push_flash(
                    &viewer.session_token,
                    Flash::error("You do not have permission to post events in this community."),
                )
                .await;
            return Ok(Redirect::to("/events").into_response());
        }
    }

    let event = Event::create(&validated.changes(), viewer.user_id, &state.db_pool).await?;
    state
        .sessions
        .push_flash(&viewer.session_token, Flash::success("Event saved."))
        .await;

    Ok(match event.community_id {
        Some(community_id) => Redirect::to(&format!("/communities/{community_id}")).into_response(),
        None => Redirect::to("/events").into_response(),
    })
}

pub async fn edit_form(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(event_id): Path<EventId>,
) -> AppResult<Response> {
    let event = Event::find_by_id(event_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Event"))?;
    let form = EventSubmission::from_event(&event);
    render_form(
        &viewer,
        &state,
        "Edit event",
        &format!("/events/{event_id}/edit"),
        &form,
        &FieldErrors::new(),
        None,
    )
    .await
}

pub async fn update(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(event_id): Path<EventId>,
    Form(form): Form<EventSubmission>,
) -> AppResult<Response> {
    let event = Event::find_by_id(event_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Event"))?;

    let today = Local::now().date_naive();
    let validated = match form.validate(today) {
        Ok(validated) => validated,
        Err(errors) => {
            return render_form(
                &viewer,
                &state,
                "Edit event",
                &format!("/events/{event_id}/edit"),
                &form,
                &errors,
                None,
            )
            .await;
        }
    };

    // The editor must hold posting rights in the target community; this also
    // covers an unchanged community, and prevents moving an event somewhere
    // the editor cannot post.
    if let Some(target) = validated.community_id {
        let membership = Membership::load(target, &state.db_pool)
            .await?
            .ok_or(AppError::NotFound("Community"))?;
        if !membership.is_member(viewer.id()) {
            state
                .sessions
                .push_flash(
                    &viewer.session_token,
                    Flash::error("You cannot move this event into that community."),
                )
                .await;
            return Ok(Redirect::to(&format!("/events/{event_id}")).into_response());
        }
    }

    Event::update(event.id, &validated.changes(), &state.db_pool).await?;
    state
        .sessions
        .push_flash(&viewer.session_token, Flash::success("Event updated."))
        .await;
    Ok(Redirect::to("/events").into_response())
}

pub async fn delete(
    viewer: Viewer,
    Extension(state): Extension<AxumAppState>,
    Path(event_id): Path<EventId>,
) -> AppResult<Response> {
    let event = Event::find_by_id(event_id, &state.db_pool)
        .await?
        .ok_or(AppError::NotFound("Event"))?;
    let community = match event.community_id {
        Some(community_id) => Community::find_by_id(community_id, &state.db_pool).await?,
        None => None,
    };

    if !may_delete(&event, community.as_ref().map(|c| c.owner_id), &viewer) {
        state
            .sessions
            .push_flash(
                &viewer.session_token,
                Flash::error("You cannot delete this event."),
            )
            .await;
        return Ok(Redirect::to(&format!("/events/{event_id}")).into_response());
    }

    Event::delete(event.id, &state.db_pool).await?;
    state
        .sessions
        .push_flash(&viewer.session_token, Flash::success("Event deleted."))
        .await;
    Ok(Redirect::to("/events").into_response())
}

/// Who may delete an event: its creator, or the owner of its community.
/// Legacy rows without a recorded creator fall back to the community owner,
/// or to anyone for free-floating events.
fn may_delete(event: &Event, community_owner: Option<UserId>, viewer: &Viewer) -> bool {
    match event.created_by {
        Some(creator) => creator == viewer.user_id || community_owner == Some(viewer.user_id),
        None => community_owner.map_or(true, |owner| owner == viewer.user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn viewer(user_id: UserId) -> Viewer {
        Viewer {
            user_id,
            username: "ana".into(),
            session_token: "tok".into(),
        }
    }

    fn event(created_by: Option<UserId>, community_id: Option<CommunityId>) -> Event {
        Event {
            id: EventId::new(),
            title: "t".into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            time: None,
            place: String::new(),
            kind: Default::default(),
            created_by,
            community_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_creator_may_delete() {
        let user = UserId::new();
        assert!(may_delete(&event(Some(user), None), None, &viewer(user)));
    }

    #[test]
    fn test_community_owner_may_delete_others_events() {
        let owner = UserId::new();
        let creator = UserId::new();
        let community_id = CommunityId::new();
        assert!(may_delete(
            &event(Some(creator), Some(community_id)),
            Some(owner),
            &viewer(owner)
        ));
    }

    #[test]
    fn test_stranger_may_not_delete() {
        let creator = UserId::new();
        assert!(!may_delete(
            &event(Some(creator), None),
            None,
            &viewer(UserId::new())
        ));
    }

    #[test]
    fn test_legacy_free_floating_event_deletable() {
        assert!(may_delete(&event(None, None), None, &viewer(UserId::new())));
    }

    #[test]
    fn test_legacy_community_event_owner_only() {
        let owner = UserId::new();
        let community_id = CommunityId::new();
        let legacy = event(None, Some(community_id));
        assert!(may_delete(&legacy, Some(owner), &viewer(owner)));
        assert!(!may_delete(&legacy, Some(owner), &viewer(UserId::new())));
    }
}
