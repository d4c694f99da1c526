//! WebSocket ワイヤメッセージの DTO
//!
//! 全てのメッセージは JSON テキストフレームで、`type` フィールド
//! （kebab-case）で種別を識別します。
//!
//! `sdp` と `candidate` は不透明な文字列です。サーバーはこれらを一切
//! パースせず、そのまま転送します（中身の妥当性検証はクライアントの責務）。

use serde::{Deserialize, Serialize};

/// サーバー → クライアントのメッセージ種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    /// 接続確立（自分の ID と現在のピア一覧）
    Connected,
    /// ピア一覧（get-peers への応答）
    PeerList,
    /// ピアが参加した
    PeerJoined,
    /// ピアが退出した
    PeerLeft,
    /// ピアが表示名を変更した
    PeerRenamed,
    /// ピアの発話状態が変わった
    PeerTalking,
    /// SDP オファーの転送
    RtcOffer,
    /// SDP アンサーの転送
    RtcAnswer,
    /// ICE candidate の転送
    RtcIce,
    /// チャットメッセージ
    Chat,
    /// 入力中状態
    Typing,
    /// エラー通知（送信者のみに返る）
    Error,
}

/// クライアント → サーバーのメッセージ
///
/// 送信者の ID はメッセージに含まれない。サーバーは常に接続自体に
/// 紐づいた ID を送信者として使う（なりすまし防止）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// 表示名を設定
    SetName { name: String },
    /// ピア一覧を要求
    GetPeers,
    /// SDP オファーを特定のピアへ転送
    Offer {
        target_id: String,
        sdp: String,
        from_name: String,
    },
    /// SDP アンサーを特定のピアへ転送
    Answer { target_id: String, sdp: String },
    /// ICE candidate を特定のピアへ転送
    Ice {
        target_id: String,
        candidate: String,
    },
    /// 発話状態を通知
    Talking { talking: bool },
    /// チャットメッセージを送信
    Chat { content: String },
    /// 入力中状態を通知
    Typing { typing: bool },
}

/// ピア情報（ID と表示名の射影）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub name: String,
}

/// 接続確立メッセージ（新規接続にのみ送られる）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedMessage {
    pub r#type: MessageType,
    /// 接続に割り当てられた自分自身の ID
    pub peer_id: String,
    /// 接続時点の他のピア一覧
    pub peers: Vec<PeerInfo>,
}

/// ピア一覧メッセージ（get-peers への応答、要求者のみに返る）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerListMessage {
    pub r#type: MessageType,
    pub peers: Vec<PeerInfo>,
}

/// ピア参加メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerJoinedMessage {
    pub r#type: MessageType,
    pub peer_id: String,
    pub name: String,
}

/// ピア退出メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerLeftMessage {
    pub r#type: MessageType,
    pub peer_id: String,
}

/// 表示名変更メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRenamedMessage {
    pub r#type: MessageType,
    pub peer_id: String,
    pub name: String,
}

/// 発話状態メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerTalkingMessage {
    pub r#type: MessageType,
    pub peer_id: String,
    pub name: String,
    pub talking: bool,
}

/// SDP オファー転送メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtcOfferMessage {
    pub r#type: MessageType,
    pub from_id: String,
    pub from_name: String,
    pub sdp: String,
}

/// SDP アンサー転送メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtcAnswerMessage {
    pub r#type: MessageType,
    pub from_id: String,
    pub sdp: String,
}

/// ICE candidate 転送メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtcIceMessage {
    pub r#type: MessageType,
    pub from_id: String,
    pub candidate: String,
}

/// チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub from_id: String,
    pub from_name: String,
    pub content: String,
    /// サーバーが付与した送信時刻（RFC 3339）
    pub sent_at: String,
}

/// 入力中状態メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingMessage {
    pub r#type: MessageType,
    pub from_id: String,
    pub from_name: String,
    pub typing: bool,
}

/// エラー通知メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}
