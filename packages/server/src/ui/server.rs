//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    domain::Authenticator,
    usecase::{
        ConnectPeerUseCase, DisconnectPeerUseCase, ListPeersUseCase, RelayChatUseCase,
        RelaySignalUseCase, RenamePeerUseCase, SetTalkingUseCase,
    },
};

use super::{
    handler::{get_peers, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebRTC signaling relay server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_peer_usecase,
///     disconnect_peer_usecase,
///     rename_peer_usecase,
///     list_peers_usecase,
///     relay_signal_usecase,
///     relay_chat_usecase,
///     set_talking_usecase,
///     authenticator,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectPeerUseCase（ピア接続のユースケース）
    connect_peer_usecase: Arc<ConnectPeerUseCase>,
    /// DisconnectPeerUseCase（ピア切断のユースケース）
    disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
    /// RenamePeerUseCase（表示名変更のユースケース）
    rename_peer_usecase: Arc<RenamePeerUseCase>,
    /// ListPeersUseCase（ピア一覧取得のユースケース）
    list_peers_usecase: Arc<ListPeersUseCase>,
    /// RelaySignalUseCase（シグナリング転送のユースケース）
    relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// RelayChatUseCase（チャット・入力中状態転送のユースケース）
    relay_chat_usecase: Arc<RelayChatUseCase>,
    /// SetTalkingUseCase（発話状態転送のユースケース）
    set_talking_usecase: Arc<SetTalkingUseCase>,
    /// Authenticator（接続認証の抽象化）
    authenticator: Arc<dyn Authenticator>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_peer_usecase: Arc<ConnectPeerUseCase>,
        disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
        rename_peer_usecase: Arc<RenamePeerUseCase>,
        list_peers_usecase: Arc<ListPeersUseCase>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
        relay_chat_usecase: Arc<RelayChatUseCase>,
        set_talking_usecase: Arc<SetTalkingUseCase>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            connect_peer_usecase,
            disconnect_peer_usecase,
            rename_peer_usecase,
            list_peers_usecase,
            relay_signal_usecase,
            relay_chat_usecase,
            set_talking_usecase,
            authenticator,
        }
    }

    /// Build the axum router for this server.
    ///
    /// Public so integration tests can serve the real application on an
    /// ephemeral port without going through `run`.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            connect_peer_usecase: self.connect_peer_usecase.clone(),
            disconnect_peer_usecase: self.disconnect_peer_usecase.clone(),
            rename_peer_usecase: self.rename_peer_usecase.clone(),
            list_peers_usecase: self.list_peers_usecase.clone(),
            relay_signal_usecase: self.relay_signal_usecase.clone(),
            relay_chat_usecase: self.relay_chat_usecase.clone(),
            set_talking_usecase: self.set_talking_usecase.clone(),
            authenticator: self.authenticator.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/peers", get(get_peers))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the signaling relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Signaling relay server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
