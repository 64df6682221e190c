//! Infrastructure layer: wire DTOs, in-memory repositories and the WebSocket fan-out.

pub mod dto;
pub mod message_pusher;
pub mod repository;
