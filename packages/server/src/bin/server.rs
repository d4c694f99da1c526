//! WebRTC signaling and presence relay server.
//!
//! Brokers WebRTC connection setup (SDP offers/answers, ICE candidates) and
//! relays presence, chat and typing/talking events between browser peers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kodama-server
//! cargo run --bin kodama-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin kodama-server -- --token my-shared-secret
//! ```

use std::sync::Arc;

use clap::Parser;

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
use kodama_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kodama-server")]
#[command(about = "WebRTC signaling and presence relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Shared connection token; when omitted, all connections are accepted
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry / MessagePusher / Clock / Authenticator
    // 2. UseCases
    // 3. Server

    // 1. Shared services
    let registry = Arc::new(InMemoryPeerRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let clock = Arc::new(SystemClock);
    let authenticator: Arc<dyn Authenticator> = match args.token {
        Some(token) => {
            tracing::info!("Shared-token authentication enabled");
            Arc::new(SharedTokenAuthenticator::new(token))
        }
        None => {
            tracing::info!("No connection token configured, accepting all connections");
            Arc::new(OpenAccess)
        }
    };

    // 2. Create UseCases
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

    // 3. Create and run the server
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
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
