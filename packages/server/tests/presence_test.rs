//! End-to-end tests against a running server on an ephemeral port.

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use huddle_server::{config::ServerConfig, ui::Server};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE: Duration = Duration::from_millis(300);

/// Helper struct to manage server lifecycle
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_liveness_interval(Duration::from_secs(30)).await
    }

    async fn start_with_liveness_interval(liveness_interval: Duration) -> Self {
        let config = ServerConfig::new("127.0.0.1".to_string(), 0, liveness_interval)
            .expect("valid config");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(Server::in_memory(&config).serve(listener, async move {
            let _ = rx.await;
        }));

        TestServer {
            addr,
            shutdown: Some(tx),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect");
        client
    }

    async fn health(&self) -> Value {
        reqwest::get(self.http_url("/api/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn publish(&self, room_id: &str, event: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.http_url(&format!("/api/rooms/{}/events", room_id)))
            .json(&event)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn send(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send");
}

/// 次のテキストフレームを JSON として受け取る（ping などは読み飛ばす）
async fn recv_json(client: &mut Client) -> Value {
    loop {
        let msg = timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("frame is JSON");
        }
    }
}

async fn assert_silent(client: &mut Client) {
    loop {
        match timeout(SILENCE, client.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected frame: {}", text),
            Ok(Some(Ok(_))) => continue,
            Ok(other) => panic!("connection ended unexpectedly: {:?}", other),
        }
    }
}

/// `duration` の間フレームを読み続け、受け取った ping の数を返す
///
/// 読み続けている間は tungstenite が ping への pong を自動で返す。
async fn keep_reading(client: &mut Client, duration: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + duration;
    let mut pings = 0;
    loop {
        match tokio::time::timeout_at(deadline, client.next()).await {
            Err(_) => return pings,
            Ok(Some(Ok(Message::Ping(_)))) => pings += 1,
            Ok(Some(Ok(_))) => continue,
            Ok(other) => panic!("connection ended unexpectedly: {:?}", other),
        }
    }
}

async fn join(client: &mut Client, project_id: Value, user_id: &str) {
    send(
        client,
        json!({"type": "join_project", "projectId": project_id, "userId": user_id}),
    )
    .await;
    let ack = recv_json(client).await;
    assert_eq!(ack["type"], "joined_project");
}

#[tokio::test]
async fn test_join_ack_echoes_project_id() {
    // テスト項目: join_project に対して joined_project が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    // when (操作):
    send(
        &mut alice,
        json!({"type": "join_project", "projectId": "42", "userId": "alice"}),
    )
    .await;

    // then (期待する結果):
    let ack = recv_json(&mut alice).await;
    assert_eq!(ack, json!({"type": "joined_project", "projectId": "42"}));
}

#[tokio::test]
async fn test_room_broadcast_reaches_only_room_members() {
    // テスト項目: ルーム 42 への配信は 42 のメンバーだけに届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let mut carol = server.connect().await;
    join(&mut alice, json!("42"), "alice").await;
    join(&mut bob, json!(42), "bob").await;
    join(&mut carol, json!("7"), "carol").await;

    // when (操作):
    let event = json!({"type": "new_message", "id": 1, "text": "hello"});
    let response = server.publish("42", event.clone()).await;

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"delivered": 2}));
    assert_eq!(recv_json(&mut alice).await, event);
    assert_eq!(recv_json(&mut bob).await, event);
    assert_silent(&mut carol).await;
}

#[tokio::test]
async fn test_typing_is_relayed_to_everyone_but_sender() {
    // テスト項目: typing は送信者以外のメンバーに user_typing として届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    join(&mut alice, json!("42"), "alice").await;
    join(&mut bob, json!("42"), "bob").await;

    // when (操作):
    send(
        &mut alice,
        json!({"type": "typing", "projectId": "42", "userId": "alice", "isTyping": true}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut bob).await,
        json!({"type": "user_typing", "userId": "alice", "isTyping": true})
    );
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_malformed_frames_keep_connection_open() {
    // テスト項目: 不正なフレームを送っても接続は維持され、その後の join は処理される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    // when (操作):
    alice
        .send(Message::Text("this is not json".into()))
        .await
        .unwrap();
    send(&mut alice, json!({"type": "dance"})).await;
    send(&mut alice, json!({"type": "join_project"})).await;

    // then (期待する結果):
    join(&mut alice, json!("42"), "alice").await;
}

#[tokio::test]
async fn test_room_detail_and_cleanup_after_leave() {
    // テスト項目: ルーム詳細にアクティブメンバーが出て、全員抜けるとルームが消える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    join(&mut bob, json!("42"), "bob").await;
    join(&mut alice, json!("42"), "alice").await;

    // when (操作):
    let detail: Value = reqwest::get(server.http_url("/api/rooms/42"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(
        detail,
        json!({"id": "42", "activeMembers": ["alice", "bob"], "connectionCount": 2})
    );

    // when (操作): 両方抜ける
    send(&mut alice, json!({"type": "leave_project", "projectId": "42"})).await;
    send(&mut bob, json!({"type": "leave_project", "projectId": "42"})).await;

    // then (期待する結果): ルームが消える
    let mut status = reqwest::StatusCode::OK;
    for _ in 0..20 {
        status = reqwest::get(server.http_url("/api/rooms/42"))
            .await
            .unwrap()
            .status();
        if status == reqwest::StatusCode::NOT_FOUND {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disconnect_removes_connection_from_health() {
    // テスト項目: 切断した接続は health のカウントから消える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    join(&mut alice, json!("42"), "alice").await;
    assert_eq!(
        server.health().await,
        json!({"status": "ok", "connections": 1, "rooms": 1})
    );

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    let mut health = Value::Null;
    for _ in 0..20 {
        health = server.health().await;
        if health["connections"] == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(health, json!({"status": "ok", "connections": 0, "rooms": 0}));
}

#[tokio::test]
async fn test_publishing_non_collaborator_event_is_rejected() {
    // テスト項目: user_typing などサーバー内部のイベントは HTTP から発行できない
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = server
        .publish(
            "42",
            json!({"type": "user_typing", "userId": "mallory", "isTyping": true}),
        )
        .await;

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_room_returns_not_found() {
    // テスト項目: 存在しないルームの詳細は 404
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/api/rooms/nonexistent-room"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_liveness_keeps_responsive_client_and_evicts_silent_one() {
    // テスト項目: ping に pong を返すクライアントは何周期経っても残り、読まないクライアントは切断される
    // given (前提条件):
    let interval = Duration::from_millis(200);
    let server = TestServer::start_with_liveness_interval(interval).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    join(&mut alice, json!("42"), "alice").await;
    join(&mut bob, json!("42"), "bob").await;

    // when (操作): alice だけが読み続ける（bob は pong を返さない）
    let pings = keep_reading(&mut alice, interval * 6).await;

    // then (期待する結果):
    assert!(pings >= 3, "expected repeated probes, got {}", pings);
    let detail: Value = reqwest::get(server.http_url("/api/rooms/42"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        detail,
        json!({"id": "42", "activeMembers": ["alice"], "connectionCount": 1})
    );
    assert_eq!(server.health().await["connections"], 1);
    drop(bob);
}
