use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{handlers::events::EventContentDto, state::AppState},
    domain::{
        AdminEventPatch, AdminStateAction, Category, CreateCategoryRequest, CreateUserRequest,
        Event, User,
    },
    error::Result,
    repository::{CategoryRepository, UserRepository},
};

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateEventDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub content: EventContentDto,
    pub state_action: Option<AdminStateAction>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 2, max = 250))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(dto): Json<AdminUpdateEventDto>,
) -> Result<Json<Event>> {
    dto.validate()?;

    let patch = AdminEventPatch {
        content: dto.content.into(),
        state_action: dto.state_action,
    };

    let event = state.service_context.event_service
        .edit_by_admin(event_id, patch)
        .await?;

    Ok(Json(event))
}

pub async fn publish_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.publish(event_id).await?;
    Ok(Json(event))
}

pub async fn reject_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.reject(event_id).await?;
    Ok(Json(event))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<User>)> {
    dto.validate()?;

    let user = state.service_context.user_repo
        .create(CreateUserRequest {
            name: dto.name,
            email: dto.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(dto): Json<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>)> {
    dto.validate()?;

    let category = state.service_context.category_repo
        .create(CreateCategoryRequest { name: dto.name })
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
