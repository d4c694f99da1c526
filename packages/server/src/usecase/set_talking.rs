//! UseCase: 発話状態の転送処理
//!
//! 発話中フラグを送信者以外の全ピアへ転送します。レベルトリガーの
//! シグナルで、重複した通知もそのまま転送します（サーバー側での
//! デバウンスや状態保持は行わない）。UI の発話インジケータのためだけの
//! 情報です。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SetTalkingUseCase::execute() メソッド
//! - 送信者名の解決とブロードキャスト対象の選定
//!
//! ### なぜこのテストが必要か
//! - 発話通知が送信者以外の全ピアに向くことを保証
//! - 冗長な通知もそのまま転送されることを確認（レベルトリガー）
//!
//! ### どのような状況を想定しているか
//! - 正常系: 3 ピア構成での発話通知
//! - 異常系: 切断済みピアからの通知（切断レース）

use std::sync::Arc;

use crate::domain::{DisplayName, MessagePusher, PeerId, PeerRegistry};

use super::error::RelayError;

/// 発話状態転送のユースケース
pub struct SetTalkingUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn PeerRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SetTalkingUseCase {
    /// 新しい SetTalkingUseCase を作成
    pub fn new(registry: Arc<dyn PeerRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 発話状態の転送を準備
    ///
    /// 送信者の表示名を解決し、ブロードキャスト対象（送信者以外の全ピア）
    /// を選定する。フラグの値自体はワイヤメッセージに載るだけで、サーバー
    /// は保持しない。
    pub async fn execute(&self, from: &PeerId) -> Result<(DisplayName, Vec<PeerId>), RelayError> {
        let from_name = self
            .registry
            .get(from)
            .await
            .ok_or_else(|| RelayError::UnknownSender(from.as_str().to_string()))?;

        let targets = self
            .registry
            .list_others(from)
            .await
            .into_iter()
            .map(|peer| peer.id)
            .collect();

        Ok((from_name, targets))
    }

    /// 組み立て済みのメッセージをブロードキャスト
    pub async fn broadcast(&self, targets: Vec<PeerId>, message: &str) -> Result<(), String> {
        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Peer, Timestamp},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, registry::InMemoryPeerRegistry,
        },
    };
    use tokio::sync::mpsc;

    fn guest(id: &str) -> Peer {
        Peer::new(
            PeerId::new(id.to_string()).unwrap(),
            DisplayName::guest(),
            Timestamp::new(1000),
        )
    }

    #[tokio::test]
    async fn test_talking_reaches_all_other_peers() {
        // テスト項目: 発話通知が送信者以外の全ピアに届く
        // given (前提条件):
        let registry = Arc::new(InMemoryPeerRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let alice = guest("alice");
        let bob = guest("bob");
        let charlie = guest("charlie");
        for peer in [&alice, &bob, &charlie] {
            registry.register(peer.clone()).await.unwrap();
        }
        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        let (tx_charlie, mut rx_charlie) = mpsc::unbounded_channel();
        pusher.register_client(alice.id.clone(), tx_alice).await;
        pusher.register_client(bob.id.clone(), tx_bob).await;
        pusher.register_client(charlie.id.clone(), tx_charlie).await;
        let usecase = SetTalkingUseCase::new(registry, pusher);

        // when (操作): charlie の発話通知を転送
        let (name, targets) = usecase.execute(&charlie.id).await.unwrap();
        usecase
            .broadcast(targets.clone(), r#"{"type":"peer-talking"}"#)
            .await
            .unwrap();

        // then (期待する結果): alice と bob が受信し、charlie は受信しない
        assert_eq!(name.as_str(), DisplayName::DEFAULT);
        assert_eq!(targets.len(), 2);
        assert_eq!(
            rx_alice.recv().await,
            Some(r#"{"type":"peer-talking"}"#.to_string())
        );
        assert_eq!(
            rx_bob.recv().await,
            Some(r#"{"type":"peer-talking"}"#.to_string())
        );
        assert!(rx_charlie.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_redundant_talking_updates_are_forwarded() {
        // テスト項目: 同じ状態の重複通知もデバウンスされずに転送される
        // given (前提条件):
        let registry = Arc::new(InMemoryPeerRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let alice = guest("alice");
        let bob = guest("bob");
        registry.register(alice.clone()).await.unwrap();
        registry.register(bob.clone()).await.unwrap();
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        pusher.register_client(bob.id.clone(), tx_bob).await;
        let usecase = SetTalkingUseCase::new(registry, pusher);

        // when (操作): 同じ通知を 2 回転送
        for _ in 0..2 {
            let (_, targets) = usecase.execute(&alice.id).await.unwrap();
            usecase
                .broadcast(targets, r#"{"talking":true}"#)
                .await
                .unwrap();
        }

        // then (期待する結果): bob は 2 回受信する
        assert_eq!(rx_bob.recv().await, Some(r#"{"talking":true}"#.to_string()));
        assert_eq!(rx_bob.recv().await, Some(r#"{"talking":true}"#.to_string()));
    }

    #[tokio::test]
    async fn test_talking_from_unknown_sender_is_an_error() {
        // テスト項目: 切断済みピアからの発話通知はエラーになる
        // given (前提条件):
        let registry = Arc::new(InMemoryPeerRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SetTalkingUseCase::new(registry, pusher);
        let ghost = PeerId::new("ghost".to_string()).unwrap();

        // when (操作):
        let result = usecase.execute(&ghost).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayError::UnknownSender(_))));
    }
}
