//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
    pub rooms: usize,
}

/// One entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub active_members: Vec<String>,
}

/// `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub active_members: Vec<String>,
    pub connection_count: usize,
}

/// `POST /api/rooms/{room_id}/events`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponseDto {
    pub delivered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
