//! InMemory Connection Repository 実装
//!
//! 開いている全接続を接続 ID で保持します。Liveness Monitor の巡回対象です。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRepository};

/// インメモリ Connection Repository 実装
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    connections: Mutex<HashMap<ConnectionId, Arc<Connection>>>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn register(&self, connection: Arc<Connection>) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered", connection.id());
        connections.insert(*connection.id(), connection);
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<Connection>> {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(connection_id);
        if removed.is_some() {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
        removed
    }

    async fn all(&self) -> Vec<Arc<Connection>> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}
