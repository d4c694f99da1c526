//! メッセージ通知の trait 定義
//!
//! ドメイン層が必要とするメッセージ送信のインターフェースを定義します。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::PeerId};

/// クライアントへの送信チャンネル
///
/// WebSocket の書き込みループに接続された非同期チャンネル。送信は
/// ブロックせず、受信側の ACK を待たない（fire-and-forget）。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ通知の trait
///
/// UseCase 層はこの trait に依存し、トランスポートの具体的な実装には
/// 依存しない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, peer_id: PeerId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, peer_id: &PeerId);

    /// 特定のクライアントにメッセージを送信
    async fn push_to(&self, peer_id: &PeerId, content: &str) -> Result<(), MessagePushError>;

    /// 複数のクライアントにメッセージをブロードキャスト
    ///
    /// 一部のターゲットへの送信失敗（切断直後など）は許容し、残りへの
    /// 送信を続行する。
    async fn broadcast(
        &self,
        targets: Vec<PeerId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
