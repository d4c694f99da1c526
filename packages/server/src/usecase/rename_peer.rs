//! UseCase: 表示名変更処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RenamePeerUseCase::execute() メソッド
//! - 表示名の正規化（trim / デフォルト名フォールバック）と通知対象の選定
//!
//! ### なぜこのテストが必要か
//! - 他のピアから見える名前が空にならないことを保証
//! - 変更通知が本人以外の全ピアに向くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: 表示名の変更
//! - エッジケース: 空白のみの名前（デフォルト名になる）
//! - 異常系: 切断済みピアの rename（切断レース）

use std::sync::Arc;

use crate::domain::{DisplayName, MessagePusher, PeerId, PeerRegistry};

use super::error::RenameError;

/// 表示名変更のユースケース
pub struct RenamePeerUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RenamePeerUseCase {
    /// 新しい RenamePeerUseCase を作成
    pub fn new(registry: Arc<dyn PeerRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 表示名変更を実行
    ///
    /// # Arguments
    ///
    /// * `peer_id` - 変更するピアの ID（Domain Model、常に接続自身の ID）
    /// * `raw_name` - クライアントが送ってきた生の名前
    ///
    /// # Returns
    ///
    /// * `Ok((DisplayName, Vec<PeerId>))` - 実際に保存された表示名と通知対象
    /// * `Err(RenameError)` - ピアが接続していない
    pub async fn execute(
        &self,
        peer_id: &PeerId,
        raw_name: &str,
    ) -> Result<(DisplayName, Vec<PeerId>), RenameError> {
        let effective = self
            .registry
            .rename(peer_id, raw_name)
            .await
            .map_err(|_| RenameError::UnknownPeer(peer_id.as_str().to_string()))?;

        let targets = self
            .registry
            .list_others(peer_id)
            .await
            .into_iter()
            .map(|peer| peer.id)
            .collect();

        Ok((effective, targets))
    }

    /// 表示名の変更を他のピアにブロードキャスト
    pub async fn broadcast_renamed(
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
