//! メッセージ送信（ファンアウト）の実装
//!
//! `Broadcaster` trait の具体的な実装を提供します。
//!
//! - `websocket`: 接続ごとの送信チャンネルを使った実装

pub mod websocket;

pub use websocket::WebSocketBroadcaster;
