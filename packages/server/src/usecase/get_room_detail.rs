//! UseCase: ルーム詳細（在室者）の取得
//!
//! 在室者はキャッシュせず、問い合わせのたびに開いている接続から計算します。

use std::sync::Arc;

use crate::domain::{RoomId, RoomRegistry, RoomSnapshot, UserId};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームが存在しない場合は `None`
    pub async fn execute(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        self.registry.room(room_id).await
    }

    /// ルームの在室ユーザー ID
    pub async fn active_members(&self, room_id: &RoomId) -> Vec<UserId> {
        self.registry.active_members(room_id).await
    }
}
