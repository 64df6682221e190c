//! UseCase: 切断処理
//!
//! クライアントからの切断と Liveness Monitor による強制切断の両方がこの経路を通ります。
//! 何度呼ばれても結果は同じです（2 回目以降は何もしない）。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRepository, RoomId, RoomRegistry};

/// 切断のユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn RoomRegistry>,
    connections: Arc<dyn ConnectionRepository>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, connections: Arc<dyn ConnectionRepository>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// 接続をルームと接続テーブルから外す
    ///
    /// # Returns
    ///
    /// 接続が抜けたルーム（所属していなかった場合は `None`）
    pub async fn execute(&self, connection: &Connection) -> Option<RoomId> {
        let left = self.registry.remove_from_all_rooms(connection).await;
        if self.connections.unregister(connection.id()).await.is_some() {
            match &left {
                Some(room_id) => tracing::info!(
                    "Connection '{}' removed from room '{}' and unregistered",
                    connection.id(),
                    room_id
                ),
                None => tracing::info!("Connection '{}' unregistered", connection.id()),
            }
        }
        left
    }
}
