//! Server execution logic.

use std::{future::Future, io, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use huddle_shared::time::SystemClock;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketBroadcaster,
        repository::{InMemoryConnectionRepository, InMemoryRoomRegistry},
    },
    usecase::{
        ConnectUseCase, DisconnectUseCase, GetHealthUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, JoinProjectUseCase, LeaveProjectUseCase, LivenessMonitor,
        PublishEventUseCase,
    },
};

use super::{
    MessageRouter,
    handler::{get_room_detail, get_rooms, health_check, publish_room_event, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Presence / broadcast server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let server = Server::in_memory(&config);
/// server.run(&config).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// 巡回タスクは `serve` の開始時に起動する
    liveness_monitor: Arc<LivenessMonitor>,
}

impl Server {
    pub fn new(state: Arc<AppState>, liveness_monitor: Arc<LivenessMonitor>) -> Self {
        Self {
            state,
            liveness_monitor,
        }
    }

    /// インメモリの Registry で依存関係を組み立てる
    pub fn in_memory(config: &ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. Broadcaster
        // 3. UseCases
        // 4. MessageRouter / LivenessMonitor
        // 5. AppState

        // 1. Create Repository (in-memory)
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let connections = Arc::new(InMemoryConnectionRepository::new());

        // 2. Create Broadcaster (WebSocket implementation)
        let broadcaster = Arc::new(WebSocketBroadcaster::new(registry.clone()));

        // 3. Create UseCases
        let connect_usecase = Arc::new(ConnectUseCase::new(
            connections.clone(),
            Arc::new(SystemClock),
        ));
        let disconnect_usecase = Arc::new(DisconnectUseCase::new(
            registry.clone(),
            connections.clone(),
        ));
        let join_project_usecase = Arc::new(JoinProjectUseCase::new(registry.clone()));
        let leave_project_usecase = Arc::new(LeaveProjectUseCase::new(registry.clone()));
        let publish_event_usecase = Arc::new(PublishEventUseCase::new(broadcaster));
        let get_health_usecase = Arc::new(GetHealthUseCase::new(
            registry.clone(),
            connections.clone(),
        ));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));
        let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(registry));

        // 4. Create MessageRouter and LivenessMonitor
        let message_router = Arc::new(MessageRouter::new(
            join_project_usecase,
            leave_project_usecase,
            publish_event_usecase.clone(),
        ));
        let liveness_monitor = Arc::new(LivenessMonitor::new(
            connections,
            disconnect_usecase.clone(),
            config.liveness_interval,
        ));

        // 5. Create AppState
        let state = Arc::new(AppState {
            connect_usecase,
            disconnect_usecase,
            message_router,
            publish_event_usecase,
            get_health_usecase,
            get_rooms_usecase,
            get_room_detail_usecase,
        });

        Self::new(state, liveness_monitor)
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/rooms/{room_id}/events", post(publish_room_event))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// 設定のアドレスにバインドし、Ctrl+C / SIGTERM まで動かす
    pub async fn run(self, config: &ServerConfig) -> Result<(), ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("Presence server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", config.bind_addr());
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// バインド済みの listener で動かす
    ///
    /// `shutdown` が完了すると新しい接続の受付を止め、Liveness Monitor を停止します。
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let monitor_handle = self.liveness_monitor.clone().spawn();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        monitor_handle.abort();
        tracing::info!("Server shutdown complete");

        result.map_err(ServerError::from)
    }
}
