//! WebSocket 接続への Broadcaster 実装
//!
//! ## 責務
//!
//! - Room Registry からメンバーのスナップショットを取得
//! - ペイロードを 1 回だけ `Arc<str>` に変換し、各メンバーの送信キューに積む
//!
//! ## 設計ノート
//!
//! WebSocket への実際の書き込みは UI 層の送信タスク（`pusher_loop`）が行います。
//! ここでは送信キューに積むだけなので、ソケットの背圧で待つことはありません。
//! 1 メンバーへの送信失敗は warn ログを出してスキップし、残りの配信は続けます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Broadcaster, ConnectionId, RoomId, RoomRegistry};

/// WebSocket を使った Broadcaster 実装
pub struct WebSocketBroadcaster {
    registry: Arc<dyn RoomRegistry>,
}

impl WebSocketBroadcaster {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    async fn fan_out(
        &self,
        room_id: &RoomId,
        exclude: Option<&ConnectionId>,
        payload: &str,
    ) -> usize {
        let members = self.registry.members(room_id).await;
        if members.is_empty() {
            tracing::debug!("Room '{}' has no members, skipping broadcast", room_id);
            return 0;
        }

        let payload: Arc<str> = Arc::from(payload);
        let mut delivered = 0;
        for member in members
            .iter()
            .filter(|member| Some(member.id()) != exclude)
        {
            if member.send(payload.clone()) {
                delivered += 1;
            } else {
                tracing::warn!(
                    "Failed to push payload to connection '{}' in room '{}', skipping",
                    member.id(),
                    room_id
                );
            }
        }

        tracing::debug!(
            "Broadcasted payload to {}/{} members of room '{}'",
            delivered,
            members.len(),
            room_id
        );
        delivered
    }
}

#[async_trait]
impl Broadcaster for WebSocketBroadcaster {
    async fn broadcast(&self, room_id: &RoomId, payload: &str) -> usize {
        self.fan_out(room_id, None, payload).await
    }

    async fn broadcast_excluding(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        payload: &str,
    ) -> usize {
        self.fan_out(room_id, Some(sender), payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, OutboundFrame, Timestamp, UserId},
        infrastructure::repository::InMemoryRoomRegistry,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast: ルームの全メンバーにちょうど 1 回ずつ届く
    // - broadcast_excluding: 送信者以外に届く
    // - 存在しないルームへの配信は何もしない
    // - 一部のメンバーが閉じていても残りには届く
    // ========================================

    struct Member {
        connection: Arc<Connection>,
        rx: mpsc::UnboundedReceiver<OutboundFrame>,
    }

    impl Member {
        fn received(&mut self) -> Vec<OutboundFrame> {
            let mut frames = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                frames.push(frame);
            }
            frames
        }
    }

    async fn join_member(registry: &InMemoryRoomRegistry, room_id: &str, user_id: &str) -> Member {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Arc::new(Connection::new(
            ConnectionId::generate(),
            tx,
            Timestamp::new(1000),
        ));
        registry
            .join(
                &connection,
                RoomId::new(room_id.to_string()).unwrap(),
                UserId::new(user_id.to_string()).unwrap(),
            )
            .await;
        Member { connection, rx }
    }

    fn text(payload: &str) -> OutboundFrame {
        OutboundFrame::Text(Arc::from(payload))
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member_once() {
        // テスト項目: ルームの全メンバーにちょうど 1 回ずつ届き、他のルームには届かない
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let mut a = join_member(&registry, "42", "a").await;
        let mut b = join_member(&registry, "42", "b").await;
        let mut c = join_member(&registry, "42", "c").await;
        let mut other = join_member(&registry, "7", "d").await;
        let broadcaster = WebSocketBroadcaster::new(registry);

        // when (操作):
        let delivered = broadcaster
            .broadcast(&RoomId::new("42".to_string()).unwrap(), "m")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 3);
        assert_eq!(a.received(), vec![text("m")]);
        assert_eq!(b.received(), vec![text("m")]);
        assert_eq!(c.received(), vec![text("m")]);
        assert!(other.received().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_excluding_skips_sender() {
        // テスト項目: 送信者を除くメンバーだけに届く
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let mut a = join_member(&registry, "42", "a").await;
        let mut b = join_member(&registry, "42", "b").await;
        let mut c = join_member(&registry, "42", "c").await;
        let broadcaster = WebSocketBroadcaster::new(registry);

        // when (操作):
        let delivered = broadcaster
            .broadcast_excluding(
                &RoomId::new("42".to_string()).unwrap(),
                b.connection.id(),
                "m",
            )
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(a.received(), vec![text("m")]);
        assert!(b.received().is_empty());
        assert_eq!(c.received(), vec![text("m")]);
    }

    #[tokio::test]
    async fn test_broadcast_to_missing_room_is_noop() {
        // テスト項目: 存在しないルームへの配信はエラーにならず、誰にも届かない
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let mut a = join_member(&registry, "42", "a").await;
        let broadcaster = WebSocketBroadcaster::new(registry);

        // when (操作):
        let delivered = broadcaster
            .broadcast(&RoomId::new("nonexistent-room".to_string()).unwrap(), "m")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert!(a.received().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_continues_past_closed_member() {
        // テスト項目: 閉じたメンバーがいても残りのメンバーには届く
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let mut a = join_member(&registry, "42", "a").await;
        let b = join_member(&registry, "42", "b").await;
        let mut c = join_member(&registry, "42", "c").await;
        drop(b.rx);
        let broadcaster = WebSocketBroadcaster::new(registry);

        // when (操作):
        let delivered = broadcaster
            .broadcast(&RoomId::new("42".to_string()).unwrap(), "m")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(a.received(), vec![text("m")]);
        assert_eq!(c.received(), vec![text("m")]);
    }
}
