//! 接続認証の実装
//!
//! 本番の認証基盤（OIDC / JWT）はこのリポジトリの範囲外であり、リレーは
//! `Authenticator` trait の判定だけを信頼します。ここではデモ運用向けの
//! 2 つの実装を提供します。

use crate::domain::{AuthError, Authenticator};

/// 全ての接続を許可する実装（デフォルト）
///
/// ローカルデモ用。トークンの有無に関わらず接続を受け付ける。
pub struct OpenAccess;

impl Authenticator for OpenAccess {
    fn authenticate(&self, _token: Option<&str>) -> Result<(), AuthError> {
        Ok(())
    }
}

/// 共有トークンによる認証
///
/// 起動時に渡された固定トークンとハンドシェイクの `token` クエリ
/// パラメータを比較する。
pub struct SharedTokenAuthenticator {
    token: String,
}

impl SharedTokenAuthenticator {
    /// 新しい SharedTokenAuthenticator を作成
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl Authenticator for SharedTokenAuthenticator {
    fn authenticate(&self, token: Option<&str>) -> Result<(), AuthError> {
        match token {
            None => Err(AuthError::MissingToken),
            Some(candidate) if candidate == self.token => Ok(()),
            Some(_) => Err(AuthError::InvalidToken),
        }
    }
}
