//! UseCase: ピア接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPeerUseCase::execute() メソッド
//! - ピアの接続処理（レジストリ登録、sender 登録、参加通知対象の選定）
//!
//! ### なぜこのテストが必要か
//! - 「接続につき登録は一度だけ」の不変条件を保証
//! - 重複 ID がロジックエラーとして拒否されることを確認
//! - 参加ブロードキャストが新規ピア自身を含まないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 新規ピアの接続
//! - 異常系: 重複した接続 ID での登録試行
//! - エッジケース: 最初のピアの接続（通知対象なし）

use std::sync::Arc;

use crate::domain::{MessagePusher, Peer, PeerId, PeerRegistry, PusherChannel};

use super::error::ConnectError;

/// ピア接続のユースケース
pub struct ConnectPeerUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectPeerUseCase {
    /// 新しい ConnectPeerUseCase を作成
    pub fn new(registry: Arc<dyn PeerRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// ピア接続を実行
    ///
    /// # Arguments
    ///
    /// * `peer` - 登録するピア（Domain Model。接続 ID はトランスポート層が採番済み）
    /// * `sender` - ピアへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 接続成功
    /// * `Err(ConnectError)` - 重複 ID による登録失敗
    pub async fn execute(
        &self,
        peer: Peer,
        sender: PusherChannel,
    ) -> Result<(), ConnectError> {
        let peer_id = peer.id.clone();

        // 1. レジストリに登録（重複はロジックエラーとして拒否）
        if self.registry.register(peer).await.is_err() {
            return Err(ConnectError::DuplicatePeer(peer_id.into_string()));
        }

        // 2. MessagePusher にピアの sender を登録
        self.message_pusher.register_client(peer_id, sender).await;

        Ok(())
    }

    /// 新規ピア以外の全てのピアを取得（接続時の初期ピア一覧用）
    pub async fn list_others(&self, peer_id: &PeerId) -> Vec<Peer> {
        self.registry.list_others(peer_id).await
    }

    /// ピアが参加したことを既存のピアにブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `new_peer_id` - 新規接続したピアの ID（Domain Model）
    /// * `message` - ブロードキャストするメッセージ（JSON）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - ブロードキャスト成功
    /// * `Err(String)` - ブロードキャスト失敗
    pub async fn broadcast_joined(
        &self,
        new_peer_id: &PeerId,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<PeerId> = self
            .registry
            .list_others(new_peer_id)
            .await
            .into_iter()
            .map(|peer| peer.id)
            .collect();

        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
