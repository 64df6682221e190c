//! Repository 実装
//!
//! - `inmemory`: HashMap を使ったプロセス内実装（単一プロセス構成のみ）

pub mod inmemory;

pub use inmemory::{InMemoryConnectionRepository, InMemoryRoomRegistry};
