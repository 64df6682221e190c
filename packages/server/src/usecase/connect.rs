//! UseCase: 接続受付

use std::sync::Arc;

use huddle_shared::time::Clock;

use crate::domain::{Connection, ConnectionId, ConnectionRepository, PusherChannel, Timestamp};

/// 接続受付のユースケース
///
/// 新しい接続はどのルームにも所属しない状態で登録される。
pub struct ConnectUseCase {
    connections: Arc<dyn ConnectionRepository>,
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
    pub fn new(connections: Arc<dyn ConnectionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { connections, clock }
    }

    /// 接続を採番して登録する
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(&self, sender: PusherChannel) -> Arc<Connection> {
        let connection = Arc::new(Connection::new(
            ConnectionId::generate(),
            sender,
            Timestamp::new(self.clock.now_millis()),
        ));
        self.connections.register(connection.clone()).await;
        connection
    }
}
