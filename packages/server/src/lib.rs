//! Project-scoped presence and broadcast server.
//!
//! Clients connect over WebSocket, join a room keyed by project id, and receive
//! events published to that room. A liveness monitor evicts silent connections.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
