//! Server-rendered HTML pages.
//!
//! Deliberately plain string rendering: the pages are form-and-list glue
//! around the domain logic, and no markup here carries behavior. Every
//! user-supplied value passes through [`escape`].

use axum::response::Html;

use crate::common::forms::{FieldErrors, FORM};
use crate::common::Viewer;
use crate::domains::accounts::forms::{LoginForm, ProfileForm, RegistrationForm};
use crate::domains::accounts::models::{Profile, User};
use crate::domains::communities::forms::CommunityForm;
use crate::domains::communities::Community;
use crate::domains::events::{Event, EventKind, EventSubmission};
use crate::server::auth::{Flash, FlashLevel};

/// Escape a value for embedding in HTML text or attribute position.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn flash_class(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Info => "info",
        FlashLevel::Success => "success",
        FlashLevel::Error => "error",
    }
}

/// Wrap a page body in the shared chrome: nav for signed-in users, flash
/// notices, footer-free minimal markup.
pub fn layout(title: &str, viewer: Option<&Viewer>, flashes: &[Flash], body: &str) -> Html<String> {
    let nav = match viewer {
        Some(viewer) => format!(
            "<nav><a href=\"/\">EventWall</a> | <a href=\"/events\">Events</a> | \
             <a href=\"/communities\">Communities</a> | <a href=\"/profile\">Profile</a> | \
             <span>{}</span> \
             <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
             <button type=\"submit\">Log out</button></form></nav>",
            escape(&viewer.username)
        ),
        None => "<nav><a href=\"/login\">Log in</a> | <a href=\"/register\">Register</a></nav>"
            .to_string(),
    };

    let notices: String = flashes
        .iter()
        .map(|flash| {
            format!(
                "<p class=\"flash {}\">{}</p>",
                flash_class(flash.level),
                escape(&flash.message)
            )
        })
        .collect();

    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{} - EventWall</title></head>\
         <body>{nav}{notices}{body}</body></html>",
        escape(title)
    ))
}

/// Render the errors recorded for one field as an inline list.
fn errors_for(errors: &FieldErrors, field: &str) -> String {
    let messages = errors.get(field);
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!("<ul class=\"errors\">{items}</ul>")
}

fn text_input(label: &str, name: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        "<p><label>{label}<br><input type=\"text\" name=\"{name}\" value=\"{}\"></label>{}</p>",
        escape(value),
        errors_for(errors, name)
    )
}

fn password_input(label: &str, name: &str, errors: &FieldErrors) -> String {
    format!(
        "<p><label>{label}<br><input type=\"password\" name=\"{name}\"></label>{}</p>",
        errors_for(errors, name)
    )
}

fn textarea(label: &str, name: &str, value: &str) -> String {
    format!(
        "<p><label>{label}<br><textarea name=\"{name}\">{}</textarea></label></p>",
        escape(value)
    )
}

// ---------------------------------------------------------------- accounts

pub fn login_page(form: &LoginForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1>{}<form method=\"post\" action=\"/login\">{}{}\
         <p><button type=\"submit\">Log in</button></p></form>\
         <p>No account? <a href=\"/register\">Register</a></p>",
        errors_for(errors, FORM),
        text_input("Username", "username", &form.username, errors),
        password_input("Password", "password", errors),
    );
    layout("Log in", None, &[], &body)
}

pub fn register_page(form: &RegistrationForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        "<h1>Register</h1>{}<form method=\"post\" action=\"/register\">{}{}{}{}\
         <p><button type=\"submit\">Register</button></p></form>\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
        errors_for(errors, FORM),
        text_input("Username", "username", &form.username, errors),
        text_input("Email", "email", &form.email, errors),
        password_input("Password", "password1", errors),
        password_input("Confirm password", "password2", errors),
    );
    layout("Register", None, &[], &body)
}

pub fn home_page(viewer: &Viewer, flashes: &[Flash]) -> Html<String> {
    let body = format!(
        "<h1>Welcome, {}</h1>\
         <p><a href=\"/events\">Browse events</a> or <a href=\"/communities\">find a community</a>.</p>",
        escape(&viewer.username)
    );
    layout("Home", Some(viewer), flashes, &body)
}

pub fn profile_page(
    viewer: &Viewer,
    flashes: &[Flash],
    profile: &Profile,
    form: &ProfileForm,
) -> Html<String> {
    let photo = if profile.photo_url.is_empty() {
        String::new()
    } else {
        format!("<p><img src=\"{}\" alt=\"photo\"></p>", escape(&profile.photo_url))
    };
    let errors = FieldErrors::new();
    let body = format!(
        "<h1>{}</h1>{photo}\
         <form method=\"post\" action=\"/profile\">{}{}{}\
         <p><button type=\"submit\">Save</button></p></form>",
        escape(&viewer.username),
        textarea("Bio", "bio", &form.bio),
        text_input("Phone", "phone", &form.phone, &errors),
        text_input("Photo URL", "photo_url", &form.photo_url, &errors),
    );
    layout("Profile", Some(viewer), flashes, &body)
}

// ------------------------------------------------------------------ events

fn event_row(event: &Event) -> String {
    let time = event
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    format!(
        "<li>{} {} <a href=\"/events/{}\">{}</a> ({})</li>",
        event.date.format("%Y-%m-%d"),
        time,
        event.id,
        escape(&event.title),
        event.kind,
    )
}

pub fn events_list_page(viewer: &Viewer, flashes: &[Flash], events: &[Event]) -> Html<String> {
    let rows: String = events.iter().map(event_row).collect();
    let body = format!(
        "<h1>Events</h1><p><a href=\"/events/new\">New event</a></p><ul>{rows}</ul>"
    );
    layout("Events", Some(viewer), flashes, &body)
}

pub fn event_detail_page(
    viewer: &Viewer,
    flashes: &[Flash],
    event: &Event,
    community: Option<&Community>,
    can_delete: bool,
) -> Html<String> {
    let time = event
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let community_line = match community {
        Some(c) => format!(
            "<p>Community: <a href=\"/communities/{}\">{}</a></p>",
            c.id,
            escape(&c.name)
        ),
        None => String::new(),
    };
    let delete_form = if can_delete {
        format!(
            "<form method=\"post\" action=\"/events/{}/delete\">\
             <button type=\"submit\">Delete</button></form>",
            event.id
        )
    } else {
        String::new()
    };
    let body = format!(
        "<h1>{}</h1>\
         <p>{} at {} | {} | {}</p>\
         <p>{}</p>{community_line}\
         <p><a href=\"/events/{}/edit\">Edit</a></p>{delete_form}",
        escape(&event.title),
        event.date.format("%Y-%m-%d"),
        time,
        escape(&event.place),
        event.kind,
        escape(&event.description),
        event.id,
    );
    layout(&event.title, Some(viewer), flashes, &body)
}

/// The event submission form, for both create and edit.
///
/// `communities` are the viewer's posting choices; when `locked` is set the
/// community is fixed (community-scoped creation) and rendered as a hidden
/// field instead of a select.
pub fn event_form_page(
    viewer: &Viewer,
    flashes: &[Flash],
    heading: &str,
    action: &str,
    form: &EventSubmission,
    errors: &FieldErrors,
    communities: &[Community],
    locked: Option<&Community>,
) -> Html<String> {
    let kind_options: String = EventKind::ALL
        .iter()
        .map(|kind| {
            let selected = if form.kind == kind.as_str() { " selected" } else { "" };
            format!("<option value=\"{kind}\"{selected}>{kind}</option>")
        })
        .collect();

    let community_field = match locked {
        Some(community) => format!(
            "<p>Community: {}<input type=\"hidden\" name=\"community\" value=\"{}\"></p>",
            escape(&community.name),
            community.id
        ),
        None => {
            let options: String = communities
                .iter()
                .map(|c| {
                    let selected = if form.community == c.id.to_string() {
                        " selected"
                    } else {
                        ""
                    };
                    format!(
                        "<option value=\"{}\"{selected}>{}</option>",
                        c.id,
                        escape(&c.name)
                    )
                })
                .collect();
            format!(
                "<p><label>Community<br><select name=\"community\">\
                 <option value=\"\">(none)</option>{options}</select></label>{}</p>",
                errors_for(errors, "community")
            )
        }
    };

    let body = format!(
        "<h1>{}</h1><form method=\"post\" action=\"{}\">{}{}{}{}{}{}\
         <p><label>Type<br><select name=\"kind\">{kind_options}</select></label>{}</p>\
         {community_field}\
         <p><button type=\"submit\">Save</button></p></form>",
        escape(heading),
        escape(action),
        text_input("Title", "title", &form.title, errors),
        textarea("Description", "description", &form.description),
        text_input("Date (DD/MM/YYYY or YYYY-MM-DD)", "date", &form.date, errors),
        text_input("Starts (HH:MM or HH:MM AM/PM)", "start_time", &form.start_time, errors),
        text_input("Ends (HH:MM or HH:MM AM/PM)", "end_time", &form.end_time, errors),
        text_input("Place", "place", &form.place, errors),
        errors_for(errors, "kind"),
    );
    layout(heading, Some(viewer), flashes, &body)
}

// ------------------------------------------------------------- communities

fn community_row((community, is_member): &(Community, bool)) -> String {
    let badge = if *is_member { " (member)" } else { "" };
    format!(
        "<li><a href=\"/communities/{}\">{}</a>{badge} - {}</li>",
        community.id,
        escape(&community.name),
        escape(&community.description),
    )
}

pub fn communities_page(
    viewer: &Viewer,
    flashes: &[Flash],
    yours: &[(Community, bool)],
    query: &str,
    results: &[(Community, bool)],
) -> Html<String> {
    let your_rows: String = yours.iter().map(community_row).collect();
    let result_rows: String = results.iter().map(community_row).collect();
    let results_section = if query.is_empty() {
        String::new()
    } else {
        format!(
            "<h2>Results for \"{}\"</h2><ul>{result_rows}</ul>",
            escape(query)
        )
    };
    let body = format!(
        "<h1>Communities</h1>\
         <p><a href=\"/communities/new\">Create a community</a></p>\
         <form method=\"get\" action=\"/communities\">\
         <input type=\"text\" name=\"q\" value=\"{}\">\
         <button type=\"submit\">Search</button></form>\
         <h2>Yours</h2><ul>{your_rows}</ul>{results_section}",
        escape(query),
    );
    layout("Communities", Some(viewer), flashes, &body)
}

pub fn community_search_page(
    viewer: &Viewer,
    flashes: &[Flash],
    query: &str,
    results: &[(Community, bool)],
) -> Html<String> {
    let rows: String = results.iter().map(community_row).collect();
    let body = format!(
        "<h1>Search communities</h1>\
         <form method=\"get\" action=\"/communities/search\">\
         <input type=\"text\" name=\"q\" value=\"{}\">\
         <button type=\"submit\">Search</button></form><ul>{rows}</ul>",
        escape(query),
    );
    layout("Search communities", Some(viewer), flashes, &body)
}

pub fn community_form_page(
    viewer: &Viewer,
    flashes: &[Flash],
    form: &CommunityForm,
    errors: &FieldErrors,
) -> Html<String> {
    let body = format!(
        "<h1>Create a community</h1><form method=\"post\" action=\"/communities/new\">{}{}\
         <p><button type=\"submit\">Create</button></p></form>",
        text_input("Name", "name", &form.name, errors),
        textarea("Description", "description", &form.description),
    );
    layout("Create a community", Some(viewer), flashes, &body)
}

pub fn community_detail_page(
    viewer: &Viewer,
    flashes: &[Flash],
    community: &Community,
    events: &[Event],
    is_member: bool,
    is_owner: bool,
) -> Html<String> {
    let event_rows: String = events.iter().map(event_row).collect();

    let membership_controls = if is_owner {
        format!(
            "<p>You own this community.</p>\
             <form method=\"post\" action=\"/communities/{}/delete\">\
             <button type=\"submit\">Delete community</button></form>",
            community.id
        )
    } else if is_member {
        format!(
            "<form method=\"post\" action=\"/communities/{}/leave\">\
             <button type=\"submit\">Leave</button></form>",
            community.id
        )
    } else {
        format!(
            "<form method=\"post\" action=\"/communities/{}/join\">\
             <button type=\"submit\">Join</button></form>",
            community.id
        )
    };

    let new_event_link = if is_member {
        format!(
            "<p><a href=\"/communities/{}/events/new\">Post an event</a></p>",
            community.id
        )
    } else {
        String::new()
    };

    let body = format!(
        "<h1>{}</h1><p>{}</p>\
         <p><a href=\"/communities/{}/members\">Members</a></p>\
         {membership_controls}{new_event_link}\
         <h2>Events</h2><ul>{event_rows}</ul>",
        escape(&community.name),
        escape(&community.description),
        community.id,
    );
    layout(&community.name, Some(viewer), flashes, &body)
}

pub fn community_members_page(
    viewer: &Viewer,
    flashes: &[Flash],
    community: &Community,
    members: &[User],
) -> Html<String> {
    let rows: String = members
        .iter()
        .map(|user| format!("<li>{}</li>", escape(&user.username)))
        .collect();
    let body = format!(
        "<h1>Members of {}</h1><ul>{rows}</ul>\
         <p><a href=\"/communities/{}\">Back</a></p>",
        escape(&community.name),
        community.id,
    );
    layout("Members", Some(viewer), flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_covers_html_metacharacters() {
        assert_eq!(
            escape("<script>\"&'</script>"),
            "&lt;script&gt;&quot;&amp;&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_escape_passes_plain_text_through() {
        assert_eq!(escape("Chess club 2030"), "Chess club 2030");
    }

    #[test]
    fn test_login_page_renders_form_error() {
        let errors = LoginForm::invalid_credentials();
        let Html(page) = login_page(&LoginForm::default(), &errors);
        assert!(page.contains("correct username and password"));
    }

    #[test]
    fn test_layout_escapes_flash_messages() {
        let viewer = Viewer {
            user_id: crate::common::UserId::new(),
            username: "ana".into(),
            session_token: "tok".into(),
        };
        let flashes = [Flash::error("<b>bold</b>")];
        let Html(page) = layout("t", Some(&viewer), &flashes, "");
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
