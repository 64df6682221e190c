//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する `RoomRegistry` trait の具体的な実装。
//! ルーム ID → メンバー（接続 ID → 接続）の HashMap を 1 つの Mutex で保護します。
//!
//! ## ロック方針
//!
//! join / leave / 切断時の削除 / ファンアウト用のスナップショット取得は
//! すべて同じロックの中で行います。メンバーの変更はメッセージ量に比べて少ないため、
//! ルーム単位・接続単位の細かいロックは使いません。

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, JoinOutcome, RoomId, RoomRegistry, RoomSnapshot, UserId,
};

type Members = HashMap<ConnectionId, Arc<Connection>>;

/// インメモリ Room Registry 実装
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<RoomId, Members>>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

/// ルームから接続を外し、空になったルームを削除する
fn remove_member(
    rooms: &mut HashMap<RoomId, Members>,
    room_id: &RoomId,
    connection_id: &ConnectionId,
) -> bool {
    let Some(members) = rooms.get_mut(room_id) else {
        return false;
    };
    let removed = members.remove(connection_id).is_some();
    if members.is_empty() {
        rooms.remove(room_id);
        tracing::debug!("Room '{}' is empty and was removed", room_id);
    }
    removed
}

fn active_user_ids(members: &Members) -> Vec<UserId> {
    members
        .values()
        .filter(|connection| connection.is_open())
        .filter_map(|connection| connection.user_id())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn snapshot(room_id: &RoomId, members: &Members) -> RoomSnapshot {
    RoomSnapshot {
        id: room_id.clone(),
        connection_count: members.len(),
        active_members: active_user_ids(members),
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(
        &self,
        connection: &Arc<Connection>,
        room_id: RoomId,
        user_id: UserId,
    ) -> JoinOutcome {
        let mut rooms = self.rooms.lock().await;

        // 閉じた接続はルームに戻さない
        if !connection.is_open() {
            return JoinOutcome::Rejected;
        }

        let outcome = match connection.room_id() {
            Some(current) if current == room_id => {
                if rooms
                    .get(&room_id)
                    .is_some_and(|members| members.contains_key(connection.id()))
                {
                    JoinOutcome::AlreadyMember
                } else {
                    JoinOutcome::Joined
                }
            }
            Some(previous) => {
                remove_member(&mut rooms, &previous, connection.id());
                JoinOutcome::Moved { from: previous }
            }
            None => JoinOutcome::Joined,
        };

        rooms
            .entry(room_id.clone())
            .or_default()
            .insert(*connection.id(), connection.clone());
        connection.assign(room_id, user_id);

        outcome
    }

    async fn leave(&self, connection: &Connection, room_id: &RoomId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let removed = remove_member(&mut rooms, room_id, connection.id());
        connection.clear_room(room_id);
        removed
    }

    async fn remove_from_all_rooms(&self, connection: &Connection) -> Option<RoomId> {
        let mut rooms = self.rooms.lock().await;

        if let Some(room_id) = connection.room_id()
            && remove_member(&mut rooms, &room_id, connection.id())
        {
            connection.clear_room(&room_id);
            return Some(room_id);
        }

        // 記録と実際のメンバーシップが食い違っている場合は全ルームを探す
        let stale: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, members)| members.contains_key(connection.id()))
            .map(|(room_id, _)| room_id.clone())
            .collect();
        if !stale.is_empty() {
            tracing::warn!(
                "Connection '{}' was found in unrecorded rooms: {:?}",
                connection.id(),
                stale
            );
        }
        for room_id in &stale {
            remove_member(&mut rooms, room_id, connection.id());
        }
        if let Some(room_id) = connection.room_id() {
            connection.clear_room(&room_id);
        }

        stale.into_iter().next()
    }

    async fn active_members(&self, room_id: &RoomId) -> Vec<UserId> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map(active_user_ids).unwrap_or_default()
    }

    async fn members(&self, room_id: &RoomId) -> Vec<Arc<Connection>> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn room(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map(|members| snapshot(room_id, members))
    }

    async fn rooms(&self) -> Vec<RoomSnapshot> {
        let rooms = self.rooms.lock().await;
        let mut snapshots: Vec<RoomSnapshot> = rooms
            .iter()
            .map(|(room_id, members)| snapshot(room_id, members))
            .collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}
