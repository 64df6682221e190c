//! Conversion logic between DTOs and domain types.

use crate::domain::{RoomId, RoomSnapshot, UserId, ValueObjectError};
use crate::infrastructure::dto::{http, websocket::WireId};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<WireId> for RoomId {
    type Error = ValueObjectError;

    fn try_from(id: WireId) -> Result<Self, Self::Error> {
        RoomId::new(id.into_string())
    }
}

impl TryFrom<WireId> for UserId {
    type Error = ValueObjectError;

    fn try_from(id: WireId) -> Result<Self, Self::Error> {
        UserId::new(id.into_string())
    }
}

// ========================================
// Domain → DTO
// ========================================

fn user_ids_to_strings(user_ids: Vec<UserId>) -> Vec<String> {
    user_ids.into_iter().map(UserId::into_string).collect()
}

impl From<RoomSnapshot> for http::RoomSummaryDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.into_string(),
            active_members: user_ids_to_strings(snapshot.active_members),
        }
    }
}

impl From<RoomSnapshot> for http::RoomDetailDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.into_string(),
            active_members: user_ids_to_strings(snapshot.active_members),
            connection_count: snapshot.connection_count,
        }
    }
}
