//! UseCase: ルームへのイベント配信
//!
//! メッセージ・写真・レポートを保存したコラボレーターが呼ぶ入口です。
//! 配信側の失敗はここでログに出して握りつぶし、呼び出し元のリクエストを失敗させません。

use std::sync::Arc;

use crate::{
    domain::{Broadcaster, ConnectionId, RoomId},
    infrastructure::dto::websocket::ServerEvent,
};

/// イベント配信のユースケース
pub struct PublishEventUseCase {
    broadcaster: Arc<dyn Broadcaster>,
}

impl PublishEventUseCase {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }

    fn serialize(event: &ServerEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize '{}' event: {}", event.kind(), e);
                None
            }
        }
    }

    /// ルームの全メンバーに配信
    ///
    /// # Returns
    ///
    /// ペイロードを渡せたメンバー数
    pub async fn broadcast(&self, room_id: &RoomId, event: &ServerEvent) -> usize {
        let Some(payload) = Self::serialize(event) else {
            return 0;
        };
        let delivered = self.broadcaster.broadcast(room_id, &payload).await;
        tracing::debug!(
            "Published '{}' to room '{}' ({} recipients)",
            event.kind(),
            room_id,
            delivered
        );
        delivered
    }

    /// 送信者を除くルームの全メンバーに配信
    pub async fn broadcast_excluding(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        event: &ServerEvent,
    ) -> usize {
        let Some(payload) = Self::serialize(event) else {
            return 0;
        };
        let delivered = self
            .broadcaster
            .broadcast_excluding(room_id, sender, &payload)
            .await;
        tracing::debug!(
            "Published '{}' to room '{}' excluding '{}' ({} recipients)",
            event.kind(),
            room_id,
            sender,
            delivered
        );
        delivered
    }
}
