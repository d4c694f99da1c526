//! ドメイン層の値オブジェクト
//!
//! プリミティブ型をそのまま引き回さず、不変条件を型で表現します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// 接続ごとにトランスポート層が割り当てる一意な ID
///
/// 接続の生存期間中は不変で、再利用されない。クライアントが自称することは
/// できない（なりすまし防止のため、送信者 ID は常にサーバー側の値を使う）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// 新しい PeerId を作成（空文字列は不可）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyPeerId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for PeerId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PeerId の生成器
///
/// UUID v4 を使用するため衝突しない（接続ごとに新しい ID が払い出される）。
pub struct PeerIdFactory;

impl PeerIdFactory {
    /// 新しい PeerId を生成
    pub fn generate() -> PeerId {
        // UUID 文字列は常に非空なのでバリデーションを経由しない
        PeerId(Uuid::new_v4().to_string())
    }
}

/// ピアの表示名
///
/// 前後の空白は取り除かれ、空になった場合はデフォルト名に置き換えられる。
/// 他のピアから見える名前が空になることはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// 名前未設定の接続に使うデフォルトの表示名
    pub const DEFAULT: &'static str = "Guest";

    /// 生の入力文字列から表示名を作成
    ///
    /// trim した結果が空文字列の場合はデフォルト名になる。
    pub fn sanitize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::guest()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// デフォルトの表示名を作成
    pub fn guest() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
