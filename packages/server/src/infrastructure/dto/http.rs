//! HTTP API レスポンスの DTO

use serde::{Deserialize, Serialize};

/// 接続中のピアのサマリ（`GET /api/peers`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerSummaryDto {
    pub peer_id: String,
    pub name: String,
    /// 接続時刻（RFC 3339）
    pub connected_at: String,
}
