//! Domain layer: value objects, the connection entity and the interfaces
//! (registry, connection table, broadcaster) implemented by the infrastructure layer.

pub mod broadcaster;
pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use broadcaster::Broadcaster;
pub use entity::{Connection, JoinOutcome, Membership, OutboundFrame, PusherChannel, RoomSnapshot};
pub use error::ValueObjectError;
pub use repository::{ConnectionRepository, RoomRegistry};
pub use value_object::{ConnectionId, RoomId, Timestamp, UserId};

#[cfg(test)]
pub use broadcaster::MockBroadcaster;
