//! UseCase: ピア切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPeerUseCase::execute() メソッド
//! - ピアの切断処理（冪等な削除、退出通知対象の選定）
//!
//! ### なぜこのテストが必要か
//! - 切断シグナルが重複しても退出通知が一度しか飛ばないことを保証
//!   （削除が実際に行われた場合のみ通知対象が返る）
//! - 異常切断（ネットワーク断）でも同じ経路で後始末されることを前提と
//!   した設計のため、削除の冪等性はリレーの生命線
//!
//! ### どのような状況を想定しているか
//! - 正常系: ピアの切断と通知
//! - エッジケース: 最後のピアの切断（通知対象なし）
//! - 異常系: 既に削除済みのピアの切断シグナル（二重切断）

use std::sync::Arc;

use crate::domain::{MessagePusher, PeerId, PeerRegistry};

/// ピア切断のユースケース
pub struct DisconnectPeerUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectPeerUseCase {
    /// 新しい DisconnectPeerUseCase を作成
    pub fn new(registry: Arc<dyn PeerRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// ピア切断を実行
    ///
    /// 削除が実際に行われた場合のみ、退出通知対象（残りの全ピア）を返す。
    /// 既に削除済みの場合は `None` を返し、呼び出し側は通知を行わない。
    /// これにより切断シグナルが重複しても退出通知は一度しか飛ばない。
    ///
    /// # Arguments
    ///
    /// * `peer_id` - 切断するピアの ID（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Some(Vec<PeerId>)` - 削除成功。通知対象のピア ID リスト
    /// * `None` - 既に削除済み（通知不要）
    pub async fn execute(&self, peer_id: &PeerId) -> Option<Vec<PeerId>> {
        // 1. レジストリから削除（冪等）
        if !self.registry.unregister(peer_id).await {
            return None;
        }

        // 2. MessagePusher から sender を登録解除
        self.message_pusher.unregister_client(peer_id).await;

        // 3. 残りの全ピアが通知対象（自分は既に削除済み）
        let targets = self
            .registry
            .snapshot()
            .await
            .into_iter()
            .map(|peer| peer.id)
            .collect();

        Some(targets)
    }

    /// ピアが退出したことを残りのピアにブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `targets` - ブロードキャスト対象のピア ID リスト（Domain Model）
    /// * `message` - ブロードキャストするメッセージ（JSON）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - ブロードキャスト成功
    /// * `Err(String)` - ブロードキャスト失敗
    pub async fn broadcast_left(
        &self,
        targets: Vec<PeerId>,
        message: &str,
    ) -> Result<(), String> {
        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
