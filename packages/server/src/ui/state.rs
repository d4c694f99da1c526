//! Server state shared across handlers.

use std::sync::Arc;

use crate::{
    domain::Authenticator,
    usecase::{
        ConnectPeerUseCase, DisconnectPeerUseCase, ListPeersUseCase, RelayChatUseCase,
        RelaySignalUseCase, RenamePeerUseCase, SetTalkingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectPeerUseCase（ピア接続のユースケース）
    pub connect_peer_usecase: Arc<ConnectPeerUseCase>,
    /// DisconnectPeerUseCase（ピア切断のユースケース）
    pub disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
    /// RenamePeerUseCase（表示名変更のユースケース）
    pub rename_peer_usecase: Arc<RenamePeerUseCase>,
    /// ListPeersUseCase（ピア一覧取得のユースケース）
    pub list_peers_usecase: Arc<ListPeersUseCase>,
    /// RelaySignalUseCase（シグナリング転送のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// RelayChatUseCase（チャット・入力中状態転送のユースケース）
    pub relay_chat_usecase: Arc<RelayChatUseCase>,
    /// SetTalkingUseCase（発話状態転送のユースケース）
    pub set_talking_usecase: Arc<SetTalkingUseCase>,
    /// Authenticator（接続認証の抽象化）
    pub authenticator: Arc<dyn Authenticator>,
}
