//! InMemory PeerRegistry 実装
//!
//! ドメイン層が定義する PeerRegistry trait の具体的な実装。
//! Mutex で保護した HashMap をインメモリ DB として使用します。
//!
//! 接続ハンドラのタスクは並行に走るため、マップへのアクセスは必ずロックを
//! 経由します。ブロードキャスト側はロック中にスナップショットを取って
//! から送信するので、ロックを長時間保持することはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DisplayName, Peer, PeerId, PeerRegistry, RegistryError};

/// インメモリ PeerRegistry 実装
///
/// 接続中のピアを保持し、ドメイン層の PeerRegistry trait を実装します
/// （依存性の逆転）。サーバープロセスと同じ生存期間を持つサービス
/// オブジェクトとして注入されます。
pub struct InMemoryPeerRegistry {
    /// 接続中のピア（Key: PeerId）
    peers: Mutex<HashMap<PeerId, Peer>>,
}

impl InMemoryPeerRegistry {
    /// 新しい InMemoryPeerRegistry を作成
    pub fn new() -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerRegistry for InMemoryPeerRegistry {
    async fn register(&self, peer: Peer) -> Result<(), RegistryError> {
        let mut peers = self.peers.lock().await;
        if peers.contains_key(&peer.id) {
            return Err(RegistryError::DuplicatePeer(peer.id.as_str().to_string()));
        }
        peers.insert(peer.id.clone(), peer);
        Ok(())
    }

    async fn unregister(&self, id: &PeerId) -> bool {
        let mut peers = self.peers.lock().await;
        peers.remove(id).is_some()
    }

    async fn rename(&self, id: &PeerId, raw_name: &str) -> Result<DisplayName, RegistryError> {
        let mut peers = self.peers.lock().await;
        let peer = peers
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownPeer(id.as_str().to_string()))?;

        let name = DisplayName::sanitize(raw_name);
        peer.name = name.clone();
        Ok(name)
    }

    async fn get(&self, id: &PeerId) -> Option<DisplayName> {
        let peers = self.peers.lock().await;
        peers.get(id).map(|peer| peer.name.clone())
    }

    async fn list_others(&self, exclude: &PeerId) -> Vec<Peer> {
        let peers = self.peers.lock().await;
        peers
            .values()
            .filter(|peer| &peer.id != exclude)
            .cloned()
            .collect()
    }

    async fn snapshot(&self) -> Vec<Peer> {
        let peers = self.peers.lock().await;
        peers.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        let peers = self.peers.lock().await;
        peers.len()
    }
}
