//! Domain entities
//!
//! ## Connection
//!
//! クライアント 1 接続をサーバー側で表すハンドル。WebSocket そのものは UI 層が所有し、
//! このエンティティは送信用チャンネル（`PusherChannel`）と、ルーム・ユーザー・生存フラグを保持します。
//!
//! `send` は閉じた接続に対しては何もせず `false` を返します。

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{Notify, mpsc};

use super::value_object::{ConnectionId, RoomId, Timestamp, UserId};

/// 送信タスクに渡すフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// シリアライズ済みの JSON ペイロード
    Text(Arc<str>),
    /// 生存確認の probe（WebSocket Ping）
    Ping,
    /// 強制切断
    Close,
}

/// 接続ごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// 接続が現在所属しているルームとユーザー
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    pub user_id: Option<UserId>,
    pub room_id: Option<RoomId>,
}

/// `RoomRegistry::join` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 新しくルームに参加した
    Joined,
    /// すでに同じルームに参加していた
    AlreadyMember,
    /// 別のルームから移動した
    Moved { from: RoomId },
    /// 接続がすでに閉じているため参加させなかった
    Rejected,
}

/// ルームの状態（HTTP API 用のスナップショット）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    /// 登録されている接続数（閉じかけの接続を含む）
    pub connection_count: usize,
    /// 現在開いている接続のユーザー ID（ソート済み、重複なし）
    pub active_members: Vec<UserId>,
}

/// Server-side handle of one client connection
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    connected_at: Timestamp,
    sender: PusherChannel,
    alive: AtomicBool,
    terminated: AtomicBool,
    terminate_signal: Notify,
    membership: Mutex<Membership>,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: PusherChannel, connected_at: Timestamp) -> Self {
        Self {
            id,
            connected_at,
            sender,
            alive: AtomicBool::new(true),
            terminated: AtomicBool::new(false),
            terminate_signal: Notify::new(),
            membership: Mutex::new(Membership::default()),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    fn lock_membership(&self) -> MutexGuard<'_, Membership> {
        // Membership は単純な値の組なので、poison されても中身はそのまま使える
        self.membership
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn membership(&self) -> Membership {
        self.lock_membership().clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.lock_membership().user_id.clone()
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.lock_membership().room_id.clone()
    }

    /// ルームとユーザーを記録する
    ///
    /// `RoomRegistry` がロックを保持したまま呼び出す。
    pub fn assign(&self, room_id: RoomId, user_id: UserId) {
        let mut membership = self.lock_membership();
        membership.room_id = Some(room_id);
        membership.user_id = Some(user_id);
    }

    /// 記録しているルームが `room_id` と一致する場合だけクリアする
    pub fn clear_room(&self, room_id: &RoomId) -> bool {
        let mut membership = self.lock_membership();
        if membership.room_id.as_ref() == Some(room_id) {
            membership.room_id = None;
            true
        } else {
            false
        }
    }

    /// 送信タスクが生きていて、強制切断もされていない
    pub fn is_open(&self) -> bool {
        !self.terminated.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    /// ペイロードを送信キューに積む
    ///
    /// 閉じた接続への送信は no-op（`false` を返す）。
    pub fn send(&self, payload: Arc<str>) -> bool {
        if !self.is_open() {
            tracing::debug!("Connection '{}' is closed, dropping payload", self.id);
            return false;
        }
        match self.sender.send(OutboundFrame::Text(payload)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to enqueue payload for connection '{}': {}", self.id, e);
                false
            }
        }
    }

    /// 生存確認の probe を送信キューに積む
    pub fn ping(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.sender.send(OutboundFrame::Ping).is_ok()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// probe への応答を受け取った
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    /// 生存フラグを false にし、直前の値を返す
    pub fn begin_probe(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    /// 接続を強制的に閉じる
    ///
    /// 2 回目以降の呼び出しは何もしない。
    pub fn terminate(&self) {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.sender.send(OutboundFrame::Close);
        self.terminate_signal.notify_one();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// `terminate` が呼ばれるまで待つ
    pub async fn terminated(&self) {
        if self.is_terminated() {
            return;
        }
        self.terminate_signal.notified().await;
    }
}
