//! UseCase: チャット・入力中状態の転送処理
//!
//! チャット本文と入力中フラグを送信者以外の全ピアへ転送します。履歴は
//! 保持せず、配送保証もありません（best-effort ブロードキャスト）。
//! チャットの送信時刻はサーバー側で付与します（注入された Clock 経由）。
//! 入力中フラグはサーバー側で TTL 管理やデバウンスを行わず、クライアント
//! 主導の状態遷移をそのまま転送します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayChatUseCase の send_chat / set_typing
//! - 送信者名・送信時刻の解決とブロードキャスト対象の選定
//!
//! ### なぜこのテストが必要か
//! - 送信者自身に折り返さないことはチャット UI の前提
//! - 送信時刻が Clock 由来であることを FixedClock で固定して確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: 複数ピアへのチャット転送
//! - エッジケース: 他のピアがいない場合（対象なし、エラーなし）
//! - 異常系: 切断済みピアからの送信（切断レース）

use std::sync::Arc;

use kodama_shared::time::Clock;

use crate::domain::{DisplayName, MessagePusher, PeerId, PeerRegistry, Timestamp};

use super::error::RelayError;

/// チャット転送の準備結果
///
/// UI 層はこの値からワイヤメッセージを組み立て、`broadcast` に渡す。
#[derive(Debug, Clone)]
pub struct ChatStamp {
    /// 送信者の現在の表示名
    pub from_name: DisplayName,
    /// サーバーが付与する送信時刻
    pub sent_at: Timestamp,
    /// ブロードキャスト対象（送信者以外の全ピア）
    pub targets: Vec<PeerId>,
}

/// チャット・入力中状態転送のユースケース
pub struct RelayChatUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Clock（チャットの送信時刻付与用）
    clock: Arc<dyn Clock>,
}

impl RelayChatUseCase {
    /// 新しい RelayChatUseCase を作成
    pub fn new(
        registry: Arc<dyn PeerRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// チャット送信を準備
    ///
    /// 送信者の表示名を解決し、送信時刻を付与し、ブロードキャスト対象を
    /// 選定する。本文はこの層では検証しない（サイズ制限はクライアントの
    /// 責務）。
    pub async fn send_chat(&self, from: &PeerId) -> Result<ChatStamp, RelayError> {
        let from_name = self
            .registry
            .get(from)
            .await
            .ok_or_else(|| RelayError::UnknownSender(from.as_str().to_string()))?;

        let sent_at = Timestamp::new(self.clock.now_millis());
        let targets = self.broadcast_targets(from).await;

        Ok(ChatStamp {
            from_name,
            sent_at,
            targets,
        })
    }

    /// 入力中状態の転送を準備
    ///
    /// 送信者の表示名とブロードキャスト対象を返す。
    pub async fn set_typing(
        &self,
        from: &PeerId,
    ) -> Result<(DisplayName, Vec<PeerId>), RelayError> {
        let from_name = self
            .registry
            .get(from)
            .await
            .ok_or_else(|| RelayError::UnknownSender(from.as_str().to_string()))?;

        let targets = self.broadcast_targets(from).await;
        Ok((from_name, targets))
    }

    /// 組み立て済みのメッセージをブロードキャスト
    pub async fn broadcast(&self, targets: Vec<PeerId>, message: &str) -> Result<(), String> {
        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }

    async fn broadcast_targets(&self, exclude: &PeerId) -> Vec<PeerId> {
        self.registry
            .list_others(exclude)
            .await
            .into_iter()
            .map(|peer| peer.id)
            .collect()
    }
}
