use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::common::{CommunityId, EventId, UserId};

/// What kind of gathering an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "event_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Conference,
    Workshop,
    Meeting,
    #[default]
    Other,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Conference,
        EventKind::Workshop,
        EventKind::Meeting,
        EventKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Conference => "conference",
            EventKind::Workshop => "workshop",
            EventKind::Meeting => "meeting",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conference" => Ok(EventKind::Conference),
            "workshop" => Ok(EventKind::Workshop),
            "meeting" => Ok(EventKind::Meeting),
            "other" => Ok(EventKind::Other),
            _ => Err(()),
        }
    }
}

/// Event model - SQL persistence layer
///
/// `created_by` and `community_id` are nullable: legacy rows predate the
/// creator column, and an event need not belong to a community. The stored
/// `time` is the start time; no end time is persisted.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub place: String,
    pub kind: EventKind,
    pub created_by: Option<UserId>,
    pub community_id: Option<CommunityId>,
    pub created_at: DateTime<Utc>,
}

/// Field values for inserting or updating an event, produced by the form
/// validator.
#[derive(Debug, Clone)]
pub struct EventChanges<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub place: &'a str,
    pub kind: EventKind,
    pub community_id: Option<CommunityId>,
}

impl Event {
    pub async fn find_by_id(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All events, soonest first.
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events ORDER BY date ASC, time ASC NULLS LAST",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// A community's events, soonest first.
    pub async fn find_for_community(community_id: CommunityId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events WHERE community_id = $1 ORDER BY date ASC, time ASC NULLS LAST",
        )
        .bind(community_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new event created by `created_by`.
    pub async fn create(
        changes: &EventChanges<'_>,
        created_by: UserId,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO events (id, title, description, date, time, place, kind, created_by, community_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(EventId::new())
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.time)
        .bind(changes.place)
        .bind(changes.kind)
        .bind(created_by)
        .bind(changes.community_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Replace the editable fields. `created_by` never changes.
    pub async fn update(id: EventId, changes: &EventChanges<'_>, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE events
             SET title = $2, description = $3, date = $4, time = $5,
                 place = $6, kind = $7, community_id = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.time)
        .bind(changes.place)
        .bind(changes.kind)
        .bind(changes.community_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: EventId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("rave".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_event_struct() {
        // Just verify struct compiles
        let event = Event {
            id: EventId::new(),
            title: "Rust workshop".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2030, 5, 20).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0),
            place: "Room 12".to_string(),
            kind: EventKind::Workshop,
            created_by: Some(UserId::new()),
            community_id: None,
            created_at: Utc::now(),
        };

        assert_eq!(event.kind, EventKind::Workshop);
    }
}
