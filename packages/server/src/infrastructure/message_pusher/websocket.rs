//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - クライアントへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に
//! 使用します。sender マップはこの実装が単独で所有し、外部と共有しません。
//!
//! 送信は全て非ブロッキングで、受信側の ACK を待ちません。切断直後の
//! ピアへの送信失敗はブロードキャストでは警告ログに留め、残りのターゲット
//! への配送を続行します（best-effort）。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PeerId, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## フィールド
///
/// - `clients`: 接続中のピアと対応する WebSocket sender のマップ
pub struct WebSocketMessagePusher {
    /// 接続中のピアの WebSocket sender
    ///
    /// Key: PeerId
    /// Value: PusherChannel
    clients: Mutex<HashMap<PeerId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, peer_id: PeerId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Peer '{}' registered to MessagePusher", peer_id);
        clients.insert(peer_id, sender);
    }

    async fn unregister_client(&self, peer_id: &PeerId) {
        let mut clients = self.clients.lock().await;
        clients.remove(peer_id);
        tracing::debug!("Peer '{}' unregistered from MessagePusher", peer_id);
    }

    async fn push_to(&self, peer_id: &PeerId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(peer_id) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to peer '{}'", peer_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                peer_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<PeerId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!("Failed to push message to peer '{}': {}", target, e);
                } else {
                    tracing::debug!("Broadcasted message to peer '{}'", target);
                }
            } else {
                tracing::warn!("Peer '{}' not found during broadcast, skipping", target);
            }
        }

        Ok(())
    }
}
