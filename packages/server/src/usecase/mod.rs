//! UseCase layer
//!
//! UI 層（WebSocket / HTTP ハンドラー）と外部のコラボレーターから呼ばれるアプリケーションロジック。

mod connect;
mod disconnect;
mod get_health;
mod get_room_detail;
mod get_rooms;
mod join_project;
mod leave_project;
mod liveness;
mod publish_event;

pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use get_health::{GetHealthUseCase, ServerStats};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_project::JoinProjectUseCase;
pub use leave_project::LeaveProjectUseCase;
pub use liveness::{LivenessMonitor, SweepReport};
pub use publish_event::PublishEventUseCase;
