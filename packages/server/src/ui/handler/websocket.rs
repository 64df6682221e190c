//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use huddle_shared::time::millis_to_rfc3339;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{domain::OutboundFrame, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// 送信キューのフレームを WebSocket に書き出すタスクを起動する
///
/// `Close` を書き出した時点、またはソケットへの書き込みに失敗した時点で終了します。
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let (message, is_close) = match frame {
                OutboundFrame::Text(payload) => (Message::Text(payload.to_string().into()), false),
                OutboundFrame::Ping => (Message::Ping(Bytes::new()), false),
                OutboundFrame::Close => (Message::Close(None), true),
            };
            if let Err(e) = sender.send(message).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
            if is_close {
                break;
            }
        }
    })
}

/// `select!` で先に終わったもの
enum TaskExit {
    Receiver,
    Pusher,
    Terminated,
}

/// タスクを中断し、終了するまで待つ
async fn stop_task(task: JoinHandle<()>) {
    task.abort();
    if let Err(e) = task.await
        && !e.is_cancelled()
    {
        tracing::error!("Connection task failed: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = state.connect_usecase.execute(tx).await;
    tracing::info!(
        "Connection '{}' opened at {}",
        connection.id(),
        millis_to_rfc3339(connection.connected_at().value()).unwrap_or_default()
    );

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let recv_connection = connection.clone();
    let message_router = state.message_router.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(
                        "WebSocket error on connection '{}': {}",
                        recv_connection.id(),
                        e
                    );
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!(
                        "Received text from '{}': {}",
                        recv_connection.id(),
                        text.as_str()
                    );
                    message_router.route(&recv_connection, text.as_str()).await;
                }
                Message::Pong(_) => {
                    recv_connection.mark_alive();
                }
                Message::Ping(_) => {
                    // pong は WebSocket 層が自動で返す
                    tracing::trace!("Received ping from '{}'", recv_connection.id());
                }
                Message::Binary(data) => {
                    tracing::warn!(
                        "Ignoring binary frame ({} bytes) from '{}'",
                        data.len(),
                        recv_connection.id()
                    );
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection.id());
                    break;
                }
            }
        }
    });

    let exited = tokio::select! {
        _ = &mut recv_task => TaskExit::Receiver,
        _ = &mut send_task => TaskExit::Pusher,
        _ = connection.terminated() => TaskExit::Terminated,
    };

    // 受信タスクが処理中の join を終えてから後始末する
    match exited {
        TaskExit::Receiver => stop_task(send_task).await,
        TaskExit::Pusher => stop_task(recv_task).await,
        TaskExit::Terminated => {
            stop_task(recv_task).await;
            stop_task(send_task).await;
        }
    }

    state.disconnect_usecase.execute(&connection).await;
    tracing::info!("Connection '{}' closed", connection.id());
}
