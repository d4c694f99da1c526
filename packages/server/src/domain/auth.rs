//! 接続認証の trait 定義
//!
//! 本体の認証基盤（OIDC / JWT）は外部のコラボレーターとして扱い、
//! リレーは「接続を許可するか」の判定結果だけを信頼します。判定は
//! WebSocket ハンドシェイク時に一度だけ行われ、以降のメッセージごとの
//! 再検証は行いません。

use super::error::AuthError;

/// 接続認証の trait
///
/// ハンドシェイクに付与されたトークン（なければ `None`）を検証する。
pub trait Authenticator: Send + Sync {
    /// トークンを検証し、接続を許可するか判定する
    fn authenticate(&self, token: Option<&str>) -> Result<(), AuthError>;
}
