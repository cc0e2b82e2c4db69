use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Event, EventState, Location},
    error::{AppError, Result},
    repository::EventRepository,
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    organizer_id: String,
    category_id: String,
    title: String,
    annotation: String,
    description: String,
    event_date: NaiveDateTime,
    location_lat: f64,
    location_lon: f64,
    paid: i32,
    participant_limit: i64,
    request_moderation: i32,
    state: String,
    confirmed_count: i64,
    created_on: NaiveDateTime,
    published_on: Option<NaiveDateTime>,
    version: i64,
}

const EVENT_COLUMNS: &str = r#"
    id, organizer_id, category_id, title, annotation, description,
    event_date, location_lat, location_lon, paid, participant_limit,
    request_moderation, state, confirmed_count, created_on, published_on, version
"#;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        let parse_id = |s: &str| Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()));

        Ok(Event {
            id: parse_id(&row.id)?,
            organizer_id: parse_id(&row.organizer_id)?,
            category_id: parse_id(&row.category_id)?,
            title: row.title,
            annotation: row.annotation,
            description: row.description,
            event_date: DateTime::from_naive_utc_and_offset(row.event_date, Utc),
            location: Location {
                lat: row.location_lat,
                lon: row.location_lon,
            },
            paid: row.paid != 0,
            participant_limit: row.participant_limit,
            request_moderation: row.request_moderation != 0,
            state: EventState::parse(&row.state)
                .ok_or_else(|| AppError::Database(format!("Invalid event state: {}", row.state)))?,
            confirmed_count: row.confirmed_count,
            created_on: DateTime::from_naive_utc_and_offset(row.created_on, Utc),
            published_on: row.published_on.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            version: row.version,
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, event: Event) -> Result<Event> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, organizer_id, category_id, title, annotation, description,
                event_date, location_lat, location_lon, paid, participant_limit,
                request_moderation, state, confirmed_count, created_on, published_on, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, NULL, 0)
            "#
        )
        .bind(event.id.to_string())
        .bind(event.organizer_id.to_string())
        .bind(event.category_id.to_string())
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.event_date.naive_utc())
        .bind(event.location.lat)
        .bind(event.location.lon)
        .bind(event.paid as i32)
        .bind(event.participant_limit)
        .bind(event.request_moderation as i32)
        .bind(event.state.as_str())
        .bind(event.created_on.naive_utc())
        .execute(&self.pool)
        .await?;

        self.find_by_id(event.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created event".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list_by_organizer(&self, organizer_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE organizer_id = ?
            ORDER BY event_date ASC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(organizer_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_event)
            .collect()
    }

    async fn update(&self, event: Event) -> Result<Event> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET category_id = ?, title = ?, annotation = ?, description = ?,
                event_date = ?, location_lat = ?, location_lon = ?, paid = ?,
                participant_limit = ?, request_moderation = ?, state = ?,
                published_on = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#
        )
        .bind(event.category_id.to_string())
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.event_date.naive_utc())
        .bind(event.location.lat)
        .bind(event.location.lon)
        .bind(event.paid as i32)
        .bind(event.participant_limit)
        .bind(event.request_moderation as i32)
        .bind(event.state.as_str())
        .bind(event.published_on.map(|dt| dt.naive_utc()))
        .bind(event.id.to_string())
        .bind(event.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Event {} was modified concurrently",
                event.id
            )));
        }

        self.find_by_id(event.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated event".to_string())
        })
    }
}
