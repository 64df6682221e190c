//! UseCase: プロジェクト（ルーム）からの退出

use std::sync::Arc;

use crate::domain::{Connection, RoomId, RoomRegistry};

/// ルーム退出のユースケース
///
/// 参加していないルームからの退出は何もしない（エラーにもしない）。ack は送らない。
pub struct LeaveProjectUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveProjectUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, connection: &Connection, room_id: &RoomId) -> bool {
        let removed = self.registry.leave(connection, room_id).await;
        if removed {
            tracing::info!(
                "Connection '{}' left room '{}'",
                connection.id(),
                room_id
            );
        } else {
            tracing::debug!(
                "Connection '{}' was not in room '{}', ignoring leave",
                connection.id(),
                room_id
            );
        }
        removed
    }
}
