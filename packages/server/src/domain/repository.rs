//! Repository trait 定義
//!
//! ドメイン層が必要とする共有状態へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{Connection, ConnectionId, JoinOutcome, RoomId, RoomSnapshot, UserId};

/// Room Registry trait
///
/// ルーム ID（プロジェクト ID）から参加中の接続集合へのマッピング。
///
/// ## 不変条件
///
/// - メンバーが 0 人のルームは残らない
/// - 1 つの接続が所属するルームは高々 1 つ（後から join したルームが優先）
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 接続をルームに参加させる
    ///
    /// 別のルームに所属していた場合は先にそのルームから抜ける。
    async fn join(
        &self,
        connection: &Arc<Connection>,
        room_id: RoomId,
        user_id: UserId,
    ) -> JoinOutcome;

    /// 接続をルームから外す
    ///
    /// ルームやメンバーシップが存在しない場合は何もせず `false` を返す。
    async fn leave(&self, connection: &Connection, room_id: &RoomId) -> bool;

    /// 接続が所属しているルームから外す（切断時）
    async fn remove_from_all_rooms(&self, connection: &Connection) -> Option<RoomId>;

    /// ルーム内で現在開いている接続のユーザー ID
    async fn active_members(&self, room_id: &RoomId) -> Vec<UserId>;

    /// ルームのメンバーのスナップショット（ファンアウト用）
    async fn members(&self, room_id: &RoomId) -> Vec<Arc<Connection>>;

    /// ルームの状態
    async fn room(&self, room_id: &RoomId) -> Option<RoomSnapshot>;

    /// 全ルームの状態（ルーム ID 順）
    async fn rooms(&self) -> Vec<RoomSnapshot>;

    /// ルーム数
    async fn room_count(&self) -> usize;
}

/// 開いている全接続のテーブル
///
/// ルームに参加していない接続も含む。Liveness Monitor が巡回する対象。
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn register(&self, connection: Arc<Connection>);

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<Connection>>;

    async fn all(&self) -> Vec<Arc<Connection>>;

    async fn count(&self) -> usize;
}
