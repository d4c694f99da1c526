//! End-to-end tests for the signaling relay over real WebSocket connections.
//!
//! Each test boots the full application (registry, pusher, use cases, axum
//! router) on an ephemeral port and drives it with tokio-tungstenite clients,
//! asserting on the actual wire frames.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use kodama_server::{
    domain::Authenticator,
    infrastructure::{
        auth::{OpenAccess, SharedTokenAuthenticator},
        message_pusher::WebSocketMessagePusher,
        registry::InMemoryPeerRegistry,
    },
    ui::Server,
    usecase::{
        ConnectPeerUseCase, DisconnectPeerUseCase, ListPeersUseCase, RelayChatUseCase,
        RelaySignalUseCase, RenamePeerUseCase, SetTalkingUseCase,
    },
};
use kodama_shared::time::SystemClock;

/// Serve the full application on an ephemeral port and return its address.
async fn spawn_server_with_auth(authenticator: Arc<dyn Authenticator>) -> SocketAddr {
    let registry = Arc::new(InMemoryPeerRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let clock = Arc::new(SystemClock);

    let connect_peer_usecase = Arc::new(ConnectPeerUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let disconnect_peer_usecase = Arc::new(DisconnectPeerUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let rename_peer_usecase = Arc::new(RenamePeerUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let list_peers_usecase = Arc::new(ListPeersUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(message_pusher.clone()));
    let relay_chat_usecase = Arc::new(RelayChatUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock,
    ));
    let set_talking_usecase = Arc::new(SetTalkingUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));

    let server = Server::new(
        connect_peer_usecase,
        disconnect_peer_usecase,
        rename_peer_usecase,
        list_peers_usecase,
        relay_signal_usecase,
        relay_chat_usecase,
        set_talking_usecase,
        authenticator,
    );
    let app = server.router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });

    addr
}

async fn spawn_server() -> SocketAddr {
    spawn_server_with_auth(Arc::new(OpenAccess)).await
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A connected relay client with its server-assigned peer id.
struct TestPeer {
    peer_id: String,
    /// Peer directory received in the `connected` message
    initial_peers: Vec<Value>,
    write: futures_util::stream::SplitSink<WsStream, Message>,
    read: futures_util::stream::SplitStream<WsStream>,
}

impl TestPeer {
    /// Connect to the relay and consume the `connected` handshake message.
    async fn connect(addr: SocketAddr) -> Self {
        let (ws_stream, _response) = connect_async(format!("ws://{}/ws", addr))
            .await
            .expect("failed to connect");
        let (write, read) = ws_stream.split();
        let mut peer = Self {
            peer_id: String::new(),
            initial_peers: Vec::new(),
            write,
            read,
        };

        let connected = peer.wait_for("connected").await;
        peer.peer_id = connected["peer_id"].as_str().expect("peer_id").to_string();
        peer.initial_peers = connected["peers"].as_array().expect("peers").clone();
        peer
    }

    /// Send one JSON frame to the server.
    async fn send(&mut self, value: Value) {
        self.write
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("failed to send frame");
    }

    /// Read frames until one with the given `type` arrives (2s timeout).
    async fn wait_for(&mut self, msg_type: &str) -> Value {
        loop {
            let frame = timeout(Duration::from_secs(2), self.read.next())
                .await
                .unwrap_or_else(|_| panic!("timed out waiting for '{}' message", msg_type))
                .expect("connection closed while waiting")
                .expect("websocket error while waiting");

            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(&text).expect("invalid JSON frame");
                if value["type"] == msg_type {
                    return value;
                }
            }
        }
    }

    /// Assert that no frame arrives within the given window.
    async fn expect_silence(&mut self, window: Duration) {
        let result = timeout(window, self.read.next()).await;
        if let Ok(Some(Ok(Message::Text(text)))) = &result {
            panic!("expected silence but received: {}", text.as_str());
        }
        assert!(result.is_err(), "expected silence but the stream made progress");
    }

    /// Close the connection from the client side.
    async fn close(mut self) {
        let _ = self.write.send(Message::Close(None)).await;
    }
}

#[tokio::test]
async fn test_get_peers_shows_each_other() {
    // テスト項目: 2 ピア接続時にお互いだけが一覧に見える
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作):
    alice.send(json!({"type": "get-peers"})).await;
    let seen_by_alice = alice.wait_for("peer-list").await;
    bob.send(json!({"type": "get-peers"})).await;
    let seen_by_bob = bob.wait_for("peer-list").await;

    // then (期待する結果):
    let alice_peers = seen_by_alice["peers"].as_array().unwrap();
    assert_eq!(alice_peers.len(), 1);
    assert_eq!(alice_peers[0]["peer_id"], bob.peer_id.as_str());
    assert_eq!(alice_peers[0]["name"], "Guest");

    let bob_peers = seen_by_bob["peers"].as_array().unwrap();
    assert_eq!(bob_peers.len(), 1);
    assert_eq!(bob_peers[0]["peer_id"], alice.peer_id.as_str());
    assert_eq!(bob_peers[0]["name"], "Guest");
}

#[tokio::test]
async fn test_connected_message_carries_existing_peers() {
    // テスト項目: 接続時の connected メッセージに既存ピアが含まれる
    // given (前提条件):
    let addr = spawn_server().await;
    let alice = TestPeer::connect(addr).await;

    // when (操作): bob が後から接続
    let bob = TestPeer::connect(addr).await;

    // then (期待する結果): alice の一覧は空、bob の一覧には alice がいる
    assert!(alice.initial_peers.is_empty());
    assert_eq!(bob.initial_peers.len(), 1);
    assert_eq!(bob.initial_peers[0]["peer_id"], alice.peer_id.as_str());
}

#[tokio::test]
async fn test_join_is_broadcast_to_existing_peers() {
    // テスト項目: 参加通知が既存ピアに届く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;

    // when (操作):
    let bob = TestPeer::connect(addr).await;

    // then (期待する結果):
    let joined = alice.wait_for("peer-joined").await;
    assert_eq!(joined["peer_id"], bob.peer_id.as_str());
    assert_eq!(joined["name"], "Guest");
}

#[tokio::test]
async fn test_rename_is_broadcast_and_visible_in_peer_list() {
    // テスト項目: 表示名変更が通知され、一覧にも反映される
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作): alice が前後に空白のある名前を設定
    alice.send(json!({"type": "set-name", "name": " Alice "})).await;

    // then (期待する結果): bob に trim 済みの名前が通知される
    let renamed = bob.wait_for("peer-renamed").await;
    assert_eq!(renamed["peer_id"], alice.peer_id.as_str());
    assert_eq!(renamed["name"], "Alice");

    // 一覧にも反映されている
    bob.send(json!({"type": "get-peers"})).await;
    let list = bob.wait_for("peer-list").await;
    assert_eq!(list["peers"][0]["name"], "Alice");

    // when (操作): 空白のみの名前を設定
    alice.send(json!({"type": "set-name", "name": "   "})).await;

    // then (期待する結果): デフォルト名に戻る
    let renamed = bob.wait_for("peer-renamed").await;
    assert_eq!(renamed["name"], "Guest");
}

#[tokio::test]
async fn test_offer_reaches_only_the_target() {
    // テスト項目: オファーが宛先のみに届く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;
    let mut charlie = TestPeer::connect(addr).await;

    // alice に溜まった参加通知を読み捨てる
    alice.wait_for("peer-joined").await;
    alice.wait_for("peer-joined").await;

    // when (操作): alice が bob にオファーを送る
    alice
        .send(json!({
            "type": "offer",
            "target_id": bob.peer_id,
            "sdp": "v=0...",
            "from_name": "Alice",
        }))
        .await;

    // then (期待する結果): bob だけが受信する
    let offer = bob.wait_for("rtc-offer").await;
    assert_eq!(offer["from_id"], alice.peer_id.as_str());
    assert_eq!(offer["from_name"], "Alice");
    assert_eq!(offer["sdp"], "v=0...");

    charlie.expect_silence(Duration::from_millis(300)).await;
    alice.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_answer_and_ice_reach_only_the_target() {
    // テスト項目: アンサーと ICE candidate が宛先のみに届く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作):
    bob.send(json!({
        "type": "answer",
        "target_id": alice.peer_id,
        "sdp": "v=0 answer",
    }))
    .await;
    bob.send(json!({
        "type": "ice",
        "target_id": alice.peer_id,
        "candidate": r#"{"candidate":"candidate:1 1 UDP ..."}"#,
    }))
    .await;

    // then (期待する結果): alice が順番どおりに受信する
    let answer = alice.wait_for("rtc-answer").await;
    assert_eq!(answer["from_id"], bob.peer_id.as_str());
    assert_eq!(answer["sdp"], "v=0 answer");

    let ice = alice.wait_for("rtc-ice").await;
    assert_eq!(ice["from_id"], bob.peer_id.as_str());
    assert_eq!(ice["candidate"], r#"{"candidate":"candidate:1 1 UDP ..."}"#);

    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_leave_is_broadcast_exactly_once() {
    // テスト項目: 切断で退出通知が一度だけ届き、一覧からも消える
    // given (前提条件):
    let addr = spawn_server().await;
    let alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;
    let alice_id = alice.peer_id.clone();

    // when (操作): alice が切断
    alice.close().await;

    // then (期待する結果): bob に退出通知が届く
    let left = bob.wait_for("peer-left").await;
    assert_eq!(left["peer_id"], alice_id.as_str());

    // 一覧からも消えている
    bob.send(json!({"type": "get-peers"})).await;
    let list = bob.wait_for("peer-list").await;
    assert!(list["peers"].as_array().unwrap().is_empty());

    // 退出通知は一度だけ（追加の peer-left は届かない）
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_offer_to_departed_peer_is_silently_dropped() {
    // テスト項目: 切断済みピア宛のオファーが黙殺される
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let bob = TestPeer::connect(addr).await;
    let bob_id = bob.peer_id.clone();
    alice.wait_for("peer-joined").await;
    bob.close().await;
    alice.wait_for("peer-left").await;

    // when (操作): いなくなった bob にオファーを送る
    alice
        .send(json!({
            "type": "offer",
            "target_id": bob_id,
            "sdp": "v=0...",
            "from_name": "Alice",
        }))
        .await;

    // then (期待する結果): 誰にも届かず、エラーも返らず、接続は生きている
    alice.expect_silence(Duration::from_millis(300)).await;
    alice.send(json!({"type": "get-peers"})).await;
    let list = alice.wait_for("peer-list").await;
    assert!(list["peers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_is_broadcast_with_server_timestamp() {
    // テスト項目: チャットが送信者以外に届き、サーバーの時刻が付与される
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作):
    alice.send(json!({"type": "chat", "content": "hi"})).await;

    // then (期待する結果):
    let chat = bob.wait_for("chat").await;
    assert_eq!(chat["from_id"], alice.peer_id.as_str());
    assert_eq!(chat["from_name"], "Guest");
    assert_eq!(chat["content"], "hi");
    let sent_at = chat["sent_at"].as_str().unwrap();
    assert!(sent_at.contains("+09:00"));

    // 送信者自身には折り返さない
    alice.wait_for("peer-joined").await; // bob の参加通知を読み捨てる
    alice.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_chat_with_no_other_peers_is_a_noop() {
    // テスト項目: 1 人きりのチャットはどこにも届かずエラーにもならない
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;

    // when (操作):
    alice.send(json!({"type": "chat", "content": "hi"})).await;

    // then (期待する結果): 何も届かず、接続は生きている
    alice.expect_silence(Duration::from_millis(300)).await;
    alice.send(json!({"type": "get-peers"})).await;
    alice.wait_for("peer-list").await;
}

#[tokio::test]
async fn test_typing_state_is_relayed() {
    // テスト項目: 入力中状態がそのまま転送される
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作):
    alice.send(json!({"type": "typing", "typing": true})).await;

    // then (期待する結果):
    let typing = bob.wait_for("typing").await;
    assert_eq!(typing["from_id"], alice.peer_id.as_str());
    assert_eq!(typing["typing"], true);

    // when (操作): 解除も転送される
    alice.send(json!({"type": "typing", "typing": false})).await;

    // then (期待する結果):
    let typing = bob.wait_for("typing").await;
    assert_eq!(typing["typing"], false);
}

#[tokio::test]
async fn test_talking_reaches_all_other_peers() {
    // テスト項目: 発話通知が送信者以外の全ピアに届く
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;
    let mut charlie = TestPeer::connect(addr).await;

    // when (操作): charlie が発話を開始
    charlie.send(json!({"type": "talking", "talking": true})).await;

    // then (期待する結果): alice と bob が受信し、charlie は受信しない
    let seen_by_alice = alice.wait_for("peer-talking").await;
    assert_eq!(seen_by_alice["peer_id"], charlie.peer_id.as_str());
    assert_eq!(seen_by_alice["name"], "Guest");
    assert_eq!(seen_by_alice["talking"], true);

    let seen_by_bob = bob.wait_for("peer-talking").await;
    assert_eq!(seen_by_bob["peer_id"], charlie.peer_id.as_str());
    assert_eq!(seen_by_bob["talking"], true);

    charlie.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_unparseable_frame_earns_an_error_reply() {
    // テスト項目: 解釈できないフレームは送信者にのみエラーが返る
    // given (前提条件):
    let addr = spawn_server().await;
    let mut alice = TestPeer::connect(addr).await;
    let mut bob = TestPeer::connect(addr).await;

    // when (操作): 未知の type を送る
    alice.send(json!({"type": "fly-to-the-moon"})).await;

    // then (期待する結果): alice にエラーが返り、bob には何も転送されない
    let error = alice.wait_for("error").await;
    assert_eq!(error["message"], "unrecognized message");
    bob.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_http_api_reports_connected_peers() {
    // テスト項目: HTTP API がヘルスチェックと接続中ピアを返す
    // given (前提条件):
    let addr = spawn_server().await;
    let _alice = TestPeer::connect(addr).await;
    let _bob = TestPeer::connect(addr).await;

    // when (操作):
    let health: Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let peers: Value = reqwest::get(format!("http://{}/api/peers", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    let peers = peers.as_array().unwrap();
    assert_eq!(peers.len(), 2);
    for peer in peers {
        assert_eq!(peer["name"], "Guest");
        assert!(peer["connected_at"].as_str().unwrap().contains("+09:00"));
        assert!(!peer["peer_id"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_shared_token_gates_the_handshake() {
    // テスト項目: 共有トークンがハンドシェイクで検証される
    // given (前提条件):
    let addr = spawn_server_with_auth(Arc::new(SharedTokenAuthenticator::new(
        "secret".to_string(),
    )))
    .await;

    // when (操作) / then (期待する結果): トークンなし・不一致は拒否される
    assert!(connect_async(format!("ws://{}/ws", addr)).await.is_err());
    assert!(
        connect_async(format!("ws://{}/ws?token=wrong", addr))
            .await
            .is_err()
    );

    // 一致するトークンでは接続できる
    let (ws_stream, _response) = connect_async(format!("ws://{}/ws?token=secret", addr))
        .await
        .expect("valid token should connect");
    drop(ws_stream);
}
