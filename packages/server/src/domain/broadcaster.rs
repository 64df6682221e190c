//! Broadcaster trait 定義
//!
//! ルームのメンバー全員へのペイロード配信（ファンアウト）のインターフェース。
//! 配信はベストエフォートで、確認応答や再送は行いません。

use async_trait::async_trait;

use super::{ConnectionId, RoomId};

/// Room fan-out
///
/// どちらのメソッドも、ペイロードを渡せたメンバー数を返す。
/// 存在しないルームへの配信はエラーではなく 0 を返す。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// ルームの全メンバーに配信
    async fn broadcast(&self, room_id: &RoomId, payload: &str) -> usize;

    /// 送信者を除くルームの全メンバーに配信
    async fn broadcast_excluding(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        payload: &str,
    ) -> usize;
}
