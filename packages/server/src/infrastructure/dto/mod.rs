//! Data Transfer Objects (DTOs) for the presence server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelopes and events
//! - `http`: HTTP API request/response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
