//! Message Router
//!
//! 受信した WebSocket のテキストフレームを `type` で振り分けます。
//!
//! | envelope        | 振り分け先                                       |
//! |-----------------|--------------------------------------------------|
//! | `join_project`  | `JoinProjectUseCase`（`joined_project` を返す）  |
//! | `leave_project` | `LeaveProjectUseCase`                            |
//! | `typing`        | 送信者を除くルームへ `user_typing` を配信        |
//!
//! 解析できないフレームや未知の `type` は warn ログを出して捨てます。接続は閉じません。

use std::sync::Arc;

use crate::{
    domain::{Connection, RoomId, UserId},
    infrastructure::dto::websocket::{ClientEnvelope, EnvelopeError, ServerEvent, parse_envelope},
    usecase::{JoinProjectUseCase, LeaveProjectUseCase, PublishEventUseCase},
};

pub struct MessageRouter {
    join_project_usecase: Arc<JoinProjectUseCase>,
    leave_project_usecase: Arc<LeaveProjectUseCase>,
    publish_event_usecase: Arc<PublishEventUseCase>,
}

impl MessageRouter {
    pub fn new(
        join_project_usecase: Arc<JoinProjectUseCase>,
        leave_project_usecase: Arc<LeaveProjectUseCase>,
        publish_event_usecase: Arc<PublishEventUseCase>,
    ) -> Self {
        Self {
            join_project_usecase,
            leave_project_usecase,
            publish_event_usecase,
        }
    }

    /// Handle one text frame from `connection`. Never fails.
    pub async fn route(&self, connection: &Arc<Connection>, text: &str) {
        if let Err(e) = self.dispatch(connection, text).await {
            tracing::warn!(
                "Dropping envelope from connection '{}': {}",
                connection.id(),
                e
            );
        }
    }

    async fn dispatch(&self, connection: &Arc<Connection>, text: &str) -> Result<(), EnvelopeError> {
        match parse_envelope(text)? {
            ClientEnvelope::JoinProject {
                project_id,
                user_id,
            } => {
                let room_id = RoomId::try_from(project_id)?;
                let user_id = UserId::try_from(user_id)?;
                self.join_project_usecase
                    .execute(connection, room_id, user_id)
                    .await;
            }
            ClientEnvelope::LeaveProject { project_id } => {
                let room_id = RoomId::try_from(project_id)?;
                self.leave_project_usecase
                    .execute(connection, &room_id)
                    .await;
            }
            ClientEnvelope::Typing {
                project_id,
                user_id,
                is_typing,
            } => {
                let room_id = RoomId::try_from(project_id)?;
                let user_id = UserId::try_from(user_id)?;
                let event = ServerEvent::UserTyping {
                    user_id: user_id.into_string(),
                    is_typing,
                };
                self.publish_event_usecase
                    .broadcast_excluding(&room_id, connection.id(), &event)
                    .await;
            }
            ClientEnvelope::Unknown => {
                // parse_envelope reports unknown types as errors
                tracing::debug!("Ignoring unknown envelope");
            }
        }
        Ok(())
    }
}
