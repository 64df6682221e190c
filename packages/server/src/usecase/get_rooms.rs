//! UseCase: ルーム一覧の取得

use std::sync::Arc;

use crate::domain::{RoomRegistry, RoomSnapshot};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム ID 順の全ルーム
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.registry.rooms().await
    }
}
