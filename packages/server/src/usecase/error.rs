//! UseCase 層のエラー型定義

use thiserror::Error;

/// 接続処理のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// 既に登録済みの接続 ID（ロジックエラー。黙殺せず接続を拒否する）
    #[error("peer '{0}' is already registered")]
    DuplicatePeer(String),
}

/// 表示名変更のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenameError {
    /// 対象のピアが接続していない
    #[error("peer '{0}' is not connected")]
    UnknownPeer(String),
}

/// リレー（チャット・状態通知）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// 送信者がレジストリに存在しない（切断レース時のみ起こりうる）
    #[error("sender '{0}' is not connected")]
    UnknownSender(String),
}
