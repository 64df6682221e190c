//! In-memory implementations of the domain repositories.

pub mod connection;
pub mod room;

pub use connection::InMemoryConnectionRepository;
pub use room::InMemoryRoomRegistry;
