//! UseCase: ピア一覧取得処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ListPeersUseCase::execute() メソッド
//! - 要求したピア以外の全ピアの取得と、要求者のみへの応答送信
//!
//! ### なぜこのテストが必要か
//! - 一覧が要求者自身を含まないことを保証
//! - 応答がブロードキャストではなく要求者のみに届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: 複数ピア接続時の一覧取得
//! - エッジケース: 自分しか接続していない場合（空の一覧）

use std::sync::Arc;

use crate::domain::{MessagePushError, MessagePusher, Peer, PeerId, PeerRegistry};

/// ピア一覧取得のユースケース
pub struct ListPeersUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ListPeersUseCase {
    /// 新しい ListPeersUseCase を作成
    pub fn new(registry: Arc<dyn PeerRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 要求したピア以外の全てのピアを取得（呼び出し時点のスナップショット）
    pub async fn execute(&self, peer_id: &PeerId) -> Vec<Peer> {
        self.registry.list_others(peer_id).await
    }

    /// 全てのピアを取得（HTTP の運用 API 用）
    pub async fn snapshot(&self) -> Vec<Peer> {
        self.registry.snapshot().await
    }

    /// 一覧の応答を要求者のみに送信
    pub async fn reply(&self, peer_id: &PeerId, message: &str) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(peer_id, message).await
    }
}
