//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{ErrorDto, HealthDto, PublishResponseDto, RoomDetailDto, RoomSummaryDto},
        websocket::ServerEvent,
    },
    ui::state::AppState,
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorDto {
            error: message.into(),
        }),
    )
}

fn parse_room_id(room_id: String) -> Result<RoomId, ApiError> {
    RoomId::new(room_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let stats = state.get_health_usecase.execute().await;
    Json(HealthDto {
        status: "ok".to_string(),
        connections: stats.connections,
        rooms: stats.rooms,
    })
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    match state.get_room_detail_usecase.execute(&room_id).await {
        Some(room) => Ok(Json(RoomDetailDto::from(room))),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("room '{}' not found", room_id),
        )),
    }
}

/// Publish a collaborator event (`new_message` など) to every member of a room
pub async fn publish_room_event(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(event): Json<ServerEvent>,
) -> Result<(StatusCode, Json<PublishResponseDto>), ApiError> {
    let room_id = parse_room_id(room_id)?;
    if !event.is_collaborator_event() {
        tracing::warn!(
            "Rejected '{}' event for room '{}': not publishable over HTTP",
            event.kind(),
            room_id
        );
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("event type '{}' cannot be published", event.kind()),
        ));
    }

    let delivered = state.publish_event_usecase.broadcast(&room_id, &event).await;
    Ok((StatusCode::ACCEPTED, Json(PublishResponseDto { delivered })))
}
