//! 接続レジストリの trait 定義
//!
//! ドメイン層が必要とする接続管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::Peer,
    error::RegistryError,
    value_object::{DisplayName, PeerId},
};

/// 接続レジストリの trait
///
/// 接続中のピアを管理する唯一の共有可変状態。複数の接続のハンドラタスクが
/// 並行に insert / remove / iterate するため、実装はスレッドセーフでなければ
/// ならない（グローバル変数ではなく、注入されたサービスオブジェクトとして
/// 使うことで単体テスト可能にする）。
#[async_trait]
pub trait PeerRegistry: Send + Sync {
    /// ピアを登録
    ///
    /// 既に同じ ID が登録されている場合は `RegistryError::DuplicatePeer` を
    /// 返す。これはロジックエラーであり、呼び出し側はログに残して接続を
    /// 拒否する（黙って上書きしない）。
    async fn register(&self, peer: Peer) -> Result<(), RegistryError>;

    /// ピアを削除
    ///
    /// 実際に削除が行われたかどうかを返す。切断シグナルが重複しても
    /// 退出通知が一度しか飛ばないよう、冪等に振る舞う。
    async fn unregister(&self, id: &PeerId) -> bool;

    /// 表示名を変更
    ///
    /// 入力は trim され、空になった場合はデフォルト名が使われる。
    /// 実際に保存された表示名を返す。
    async fn rename(&self, id: &PeerId, raw_name: &str) -> Result<DisplayName, RegistryError>;

    /// 表示名を取得
    async fn get(&self, id: &PeerId) -> Option<DisplayName>;

    /// 指定したピア以外の全てのピアを取得（呼び出し時点のスナップショット）
    async fn list_others(&self, exclude: &PeerId) -> Vec<Peer>;

    /// 全てのピアを取得（運用用の一覧表示向けスナップショット）
    async fn snapshot(&self) -> Vec<Peer>;

    /// 接続中のピア数を取得
    async fn count(&self) -> usize;
}
