//! Conversion logic between DTOs and domain entities.

use kodama_shared::time::format_jst_rfc3339;

use crate::domain::Peer;
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Peer> for dto::PeerInfo {
    fn from(peer: Peer) -> Self {
        Self {
            peer_id: peer.id.into_string(),
            name: peer.name.into_string(),
        }
    }
}

impl From<Peer> for http::PeerSummaryDto {
    fn from(peer: Peer) -> Self {
        Self {
            connected_at: format_jst_rfc3339(peer.connected_at.value()),
            peer_id: peer.id.into_string(),
            name: peer.name.into_string(),
        }
    }
}
