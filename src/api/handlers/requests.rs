use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::ParticipationRequest,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct CreateRequestParams {
    event_id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ParticipationRequest>>> {
    let requests = state.service_context.request_service
        .list_for_requester(user_id)
        .await?;

    Ok(Json(requests))
}

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<CreateRequestParams>,
) -> Result<(StatusCode, Json<ParticipationRequest>)> {
    let request = state.service_context.request_service
        .create_request(user_id, params.event_id)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ParticipationRequest>> {
    let request = state.service_context.request_service
        .cancel_request(user_id, request_id)
        .await?;

    Ok(Json(request))
}
