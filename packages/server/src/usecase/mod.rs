//! UseCase 層
//!
//! リレーの各操作を 1 ユースケース 1 モジュールで実装します。
//! 各ユースケースはドメイン層の trait（`PeerRegistry` / `MessagePusher`）
//! のみに依存し、トランスポートの詳細を知りません。

pub mod connect_peer;
pub mod disconnect_peer;
pub mod error;
pub mod list_peers;
pub mod relay_chat;
pub mod relay_signal;
pub mod rename_peer;
pub mod set_talking;

pub use connect_peer::ConnectPeerUseCase;
pub use disconnect_peer::DisconnectPeerUseCase;
pub use error::{ConnectError, RelayError, RenameError};
pub use list_peers::ListPeersUseCase;
pub use relay_chat::{ChatStamp, RelayChatUseCase};
pub use relay_signal::{RelayOutcome, RelaySignalUseCase, SignalKind};
pub use rename_peer::RenamePeerUseCase;
pub use set_talking::SetTalkingUseCase;
