//! ドメイン層のエラー型定義

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    /// PeerId が空文字列
    #[error("peer id must not be empty")]
    EmptyPeerId,
}

/// 接続レジストリのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// 既に登録済みの PeerId で register が呼ばれた
    ///
    /// トランスポート層が接続 ID の一意性を保証するため、通常は発生しない。
    /// 発生した場合はロジックエラーとして扱い、登録を拒否する（状態を壊さない）。
    #[error("peer '{0}' is already registered")]
    DuplicatePeer(String),

    /// レジストリに存在しない PeerId への操作
    #[error("peer '{0}' is not registered")]
    UnknownPeer(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    /// 送信先のクライアントが見つからない
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    /// 送信チャンネルへの書き込み失敗（切断直後など）
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// 接続認証のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// トークンが必要だが渡されていない
    #[error("connection token is missing")]
    MissingToken,

    /// トークンが一致しない
    #[error("connection token is invalid")]
    InvalidToken,
}
