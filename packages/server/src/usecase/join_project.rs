//! UseCase: プロジェクト（ルーム）への参加

use std::sync::Arc;

use crate::{
    domain::{Connection, JoinOutcome, RoomId, RoomRegistry, UserId},
    infrastructure::dto::websocket::ServerEvent,
};

/// ルーム参加のユースケース
///
/// 参加後、接続に `joined_project` の ack を送る。同じルームへの 2 回目の参加でも ack は送る。
pub struct JoinProjectUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl JoinProjectUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        connection: &Arc<Connection>,
        room_id: RoomId,
        user_id: UserId,
    ) -> JoinOutcome {
        let ack = ServerEvent::JoinedProject {
            project_id: room_id.as_str().to_string(),
        };
        let user_for_log = user_id.clone();
        let room_for_log = room_id.clone();

        let outcome = self.registry.join(connection, room_id, user_id).await;
        match &outcome {
            JoinOutcome::Joined => tracing::info!(
                "User '{}' joined room '{}' (connection '{}')",
                user_for_log,
                room_for_log,
                connection.id()
            ),
            JoinOutcome::AlreadyMember => tracing::debug!(
                "User '{}' is already in room '{}'",
                user_for_log,
                room_for_log
            ),
            JoinOutcome::Moved { from } => tracing::info!(
                "User '{}' moved from room '{}' to '{}' (connection '{}')",
                user_for_log,
                from,
                room_for_log,
                connection.id()
            ),
            JoinOutcome::Rejected => tracing::warn!(
                "Connection '{}' is closed, not joining user '{}' to room '{}'",
                connection.id(),
                user_for_log,
                room_for_log
            ),
        }
        if outcome == JoinOutcome::Rejected {
            return outcome;
        }

        match serde_json::to_string(&ack) {
            Ok(json) => {
                connection.send(json.into());
            }
            Err(e) => tracing::error!("Failed to serialize joined_project ack: {}", e),
        }

        outcome
    }
}
