//! UseCase: サーバー状態の取得

use std::sync::Arc;

use crate::domain::{ConnectionRepository, RoomRegistry};

/// 接続数とルーム数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    pub connections: usize,
    pub rooms: usize,
}

pub struct GetHealthUseCase {
    registry: Arc<dyn RoomRegistry>,
    connections: Arc<dyn ConnectionRepository>,
}

impl GetHealthUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, connections: Arc<dyn ConnectionRepository>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    pub async fn execute(&self) -> ServerStats {
        ServerStats {
            connections: self.connections.count().await,
            rooms: self.registry.room_count().await,
        }
    }
}
