//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectUseCase, DisconnectUseCase, GetHealthUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
    PublishEventUseCase,
};

use super::MessageRouter;

/// ハンドラから参照するユースケース群
pub struct AppState {
    /// ConnectUseCase（接続受付のユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// 受信フレームの振り分け
    pub message_router: Arc<MessageRouter>,
    /// PublishEventUseCase（ルームへのイベント配信のユースケース）
    pub publish_event_usecase: Arc<PublishEventUseCase>,
    pub get_health_usecase: Arc<GetHealthUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
