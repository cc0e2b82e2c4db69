use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::state::AppState,
    domain::{
        Event, EventContentPatch, Location, NewEvent, OrganizerEventPatch, OrganizerStateAction,
        ParticipationRequest, ResolutionResult, ResolutionTarget,
    },
    error::Result,
    service::validation::ensure_lead_time,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewEventDto {
    pub category_id: Uuid,
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 20, max = 2000))]
    pub annotation: String,
    #[validate(length(min = 20, max = 7000))]
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub participant_limit: i64,
    #[serde(default = "default_true")]
    pub request_moderation: bool,
}

impl From<NewEventDto> for NewEvent {
    fn from(dto: NewEventDto) -> Self {
        Self {
            category_id: dto.category_id,
            title: dto.title,
            annotation: dto.annotation,
            description: dto.description,
            event_date: dto.event_date,
            location: dto.location,
            paid: dto.paid,
            participant_limit: dto.participant_limit,
            request_moderation: dto.request_moderation,
        }
    }
}

/// Editable event fields shared by organizer and admin updates.
#[derive(Debug, Deserialize, Validate, Default)]
pub struct EventContentDto {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i64>,
    pub request_moderation: Option<bool>,
}

impl From<EventContentDto> for EventContentPatch {
    fn from(dto: EventContentDto) -> Self {
        Self {
            category_id: dto.category_id,
            title: dto.title,
            annotation: dto.annotation,
            description: dto.description,
            event_date: dto.event_date,
            location: dto.location,
            paid: dto.paid,
            participant_limit: dto.participant_limit,
            request_moderation: dto.request_moderation,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub content: EventContentDto,
    pub state_action: Option<OrganizerStateAction>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRequestsDto {
    #[validate(length(min = 1))]
    pub request_ids: Vec<Uuid>,
    pub status: ResolutionTarget,
}

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(dto): Json<NewEventDto>,
) -> Result<(StatusCode, Json<Event>)> {
    dto.validate()?;
    let rules = state.service_context.event_service.rules();
    ensure_lead_time(dto.event_date, Utc::now(), rules.organizer_lead(), "eventDate")?;

    let event = state.service_context.event_service
        .create_event(user_id, dto.into())
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>> {
    let events = state.service_context.event_service
        .list_by_organizer(user_id, params.limit, params.offset)
        .await?;

    Ok(Json(events))
}

pub async fn get(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .get_for_organizer(user_id, event_id)
        .await?;

    Ok(Json(event))
}

pub async fn update(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(Uuid, Uuid)>,
    Json(dto): Json<UpdateEventDto>,
) -> Result<Json<Event>> {
    dto.validate()?;
    if let Some(event_date) = dto.content.event_date {
        let rules = state.service_context.event_service.rules();
        ensure_lead_time(event_date, Utc::now(), rules.organizer_lead(), "eventDate")?;
    }

    let patch = OrganizerEventPatch {
        content: dto.content.into(),
        state_action: dto.state_action,
    };

    let event = state.service_context.event_service
        .edit_by_organizer(user_id, event_id, patch)
        .await?;

    Ok(Json(event))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<ParticipationRequest>>> {
    let requests = state.service_context.request_service
        .list_for_event(user_id, event_id)
        .await?;

    Ok(Json(requests))
}

pub async fn resolve_requests(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(Uuid, Uuid)>,
    Json(dto): Json<ResolveRequestsDto>,
) -> Result<Json<ResolutionResult>> {
    dto.validate()?;

    let result = state.service_context.request_service
        .resolve_batch(user_id, event_id, &dto.request_ids, dto.status)
        .await?;

    Ok(Json(result))
}

pub async fn get_published(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .get_published(event_id)
        .await?;

    Ok(Json(event))
}
