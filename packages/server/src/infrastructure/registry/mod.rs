//! 接続レジストリの実装
//!
//! ドメイン層の `PeerRegistry` trait の具体的な実装を提供します。
//! 現在はインメモリ実装のみ（リレーはシングルプロセス・非永続が前提）。

pub mod inmemory;

pub use inmemory::InMemoryPeerRegistry;
