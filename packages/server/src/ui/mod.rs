//! WebSocket / HTTP server.

mod handler;
mod router;
mod server;
mod signal;
pub mod state;

pub use router::MessageRouter;
pub use server::{Server, ServerError};
