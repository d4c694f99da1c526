//! UseCase: シグナリング転送処理
//!
//! SDP オファー / アンサー / ICE candidate を送信元から単一の宛先へ
//! 転送します。ペイロードは不透明な文字列で、一切パースしません。
//!
//! 宛先が既に切断している場合は黙って破棄します（fire-and-forget）。
//! シグナリングは本質的にレースを含む（ハンドシェイク中に相手が切断
//! しうる）ため、上位の ICE / SDP ステートマシンが再送・再ネゴシエー
//! ションで欠落を吸収する前提です。送信者にエラーは返しません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase の send_offer / send_answer / send_ice
//! - 宛先のみへの配送と、宛先不在時の黙殺
//!
//! ### なぜこのテストが必要か
//! - 転送が宛先以外に漏れないことはシグナリングの分離性の要
//! - 宛先不在がエラーにならないことは best-effort 配送の仕様そのもの
//!
//! ### どのような状況を想定しているか
//! - 正常系: 宛先への転送
//! - エッジケース: 宛先が存在しない（切断直後）

use std::sync::Arc;

use crate::domain::{MessagePusher, PeerId};

/// 転送するシグナルの種別（ログ用のラベル）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    fn label(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice candidate",
        }
    }
}

/// 転送の結果
///
/// 宛先不在はエラーではなく観測結果として返す（テストとログのため）。
/// 送信者に伝搬されることはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// 宛先の送信チャンネルに書き込んだ
    Delivered,
    /// 宛先が存在しない、または切断直後だった（黙殺）
    TargetGone,
}

/// シグナリング転送のユースケース
pub struct RelaySignalUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// SDP オファーを宛先へ転送
    pub async fn send_offer(
        &self,
        from: &PeerId,
        target: &PeerId,
        message: &str,
    ) -> RelayOutcome {
        self.relay(from, target, SignalKind::Offer, message).await
    }

    /// SDP アンサーを宛先へ転送
    pub async fn send_answer(
        &self,
        from: &PeerId,
        target: &PeerId,
        message: &str,
    ) -> RelayOutcome {
        self.relay(from, target, SignalKind::Answer, message).await
    }

    /// ICE candidate を宛先へ転送
    pub async fn send_ice(&self, from: &PeerId, target: &PeerId, message: &str) -> RelayOutcome {
        self.relay(from, target, SignalKind::IceCandidate, message)
            .await
    }

    async fn relay(
        &self,
        from: &PeerId,
        target: &PeerId,
        kind: SignalKind,
        message: &str,
    ) -> RelayOutcome {
        match self.message_pusher.push_to(target, message).await {
            Ok(()) => {
                tracing::debug!("Relayed {} from '{}' to '{}'", kind.label(), from, target);
                RelayOutcome::Delivered
            }
            Err(e) => {
                // 宛先不在は想定内（相手が切断した直後など）。黙って破棄する
                tracing::debug!(
                    "Dropping {} from '{}' to '{}': {}",
                    kind.label(),
                    from,
                    target,
                    e
                );
                RelayOutcome::TargetGone
            }
        }
    }
}
