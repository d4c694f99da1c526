//! WebSocket connection handlers.
//!
//! One physical connection = one peer. The upgrade handler authenticates,
//! assigns the connection id and registers the peer; the socket loop then
//! dispatches inbound frames to the use cases until the connection closes
//! (for any reason), at which point the peer is removed and its departure
//! broadcast exactly once.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{DisplayName, Peer, PeerId, PeerIdFactory, PusherChannel, Timestamp},
    infrastructure::dto::websocket::{
        ChatMessage, ClientMessage, ConnectedMessage, ErrorMessage, MessageType, PeerInfo,
        PeerJoinedMessage, PeerLeftMessage, PeerListMessage, PeerRenamedMessage,
        PeerTalkingMessage, RtcAnswerMessage, RtcIceMessage, RtcOfferMessage, TypingMessage,
    },
    ui::state::AppState,
    usecase::ConnectError,
};
use kodama_shared::time::{format_jst_rfc3339, now_unix_millis};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Optional connection token, verified by the authenticator before upgrade
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Authenticate before the connect hook runs; rejected connections never
    // reach the registry
    if let Err(e) = state.authenticator.authenticate(query.token.as_deref()) {
        tracing::warn!("Rejecting connection: {}", e);
        return Err(StatusCode::UNAUTHORIZED);
    }

    // The server assigns the connection id; client input never names the sender
    let peer_id = PeerIdFactory::generate();
    let peer = Peer::new(
        peer_id.clone(),
        DisplayName::guest(),
        Timestamp::new(now_unix_millis()),
    );

    // Create a channel for this peer to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    match state.connect_peer_usecase.execute(peer, tx.clone()).await {
        Ok(()) => {
            tracing::info!("Peer '{}' connected and registered", peer_id);
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, peer_id, tx, rx)))
        }
        Err(ConnectError::DuplicatePeer(id)) => {
            // Transport-assigned ids are unique; a duplicate means the registry
            // state is corrupted. Refuse the connection, keep the process alive.
            tracing::error!("Duplicate registration for peer '{}', refusing connection", id);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: messages relayed from
/// other peers (via the rx channel) are sent to this peer's WebSocket
/// connection in channel order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this peer
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    peer_id: PeerId,
    self_tx: PusherChannel,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Send the assigned id and the current peer directory to the new connection
    {
        let others = state.connect_peer_usecase.list_others(&peer_id).await;
        let connected_msg = ConnectedMessage {
            r#type: MessageType::Connected,
            peer_id: peer_id.as_str().to_string(),
            peers: others.into_iter().map(PeerInfo::from).collect(),
        };

        let connected_json = serde_json::to_string(&connected_msg).unwrap();
        if let Err(e) = sender.send(Message::Text(connected_json.into())).await {
            tracing::error!("Failed to send connected message to '{}': {}", peer_id, e);
            // The handshake aborted before the session started; the peer must
            // still be removed exactly once
            finalize_disconnect(&state, &peer_id).await;
            return;
        }
        tracing::info!("Sent connected message to '{}'", peer_id);
    }

    // Broadcast peer-joined to all other peers
    {
        let joined_msg = PeerJoinedMessage {
            r#type: MessageType::PeerJoined,
            peer_id: peer_id.as_str().to_string(),
            name: DisplayName::guest().into_string(),
        };

        let joined_json = serde_json::to_string(&joined_msg).unwrap();
        if let Err(e) = state
            .connect_peer_usecase
            .broadcast_joined(&peer_id, &joined_json)
            .await
        {
            tracing::warn!("Failed to broadcast peer-joined: {}", e);
        } else {
            tracing::info!("Broadcasted peer-joined for '{}'", peer_id);
        }
    }

    let peer_id_clone = peer_id.clone();
    let state_clone = state.clone();

    // Spawn a task to receive messages from this peer
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_client_message(&state_clone, &peer_id_clone, &self_tx, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Peer '{}' requested close", peer_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive messages from other peers and send to this peer
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    finalize_disconnect(&state, &peer_id).await;
}

/// Remove the peer and broadcast its departure exactly once.
///
/// Runs on every exit path, including abnormal disconnects and duplicate
/// close signals; the use case reports whether removal actually happened.
async fn finalize_disconnect(state: &Arc<AppState>, peer_id: &PeerId) {
    match state.disconnect_peer_usecase.execute(peer_id).await {
        Some(targets) => {
            tracing::info!("Peer '{}' disconnected and removed from registry", peer_id);

            let left_msg = PeerLeftMessage {
                r#type: MessageType::PeerLeft,
                peer_id: peer_id.as_str().to_string(),
            };

            let left_json = serde_json::to_string(&left_msg).unwrap();
            if let Err(e) = state
                .disconnect_peer_usecase
                .broadcast_left(targets, &left_json)
                .await
            {
                tracing::warn!("Failed to broadcast peer-left: {}", e);
            } else {
                tracing::info!("Broadcasted peer-left for '{}'", peer_id);
            }
        }
        None => {
            tracing::debug!("Peer '{}' was already removed", peer_id);
        }
    }
}

/// Parse one inbound frame and dispatch it to the matching use case.
///
/// The sender id is always the connection's own id; ids inside the payload
/// only ever name the *target* of a relay.
async fn dispatch_client_message(
    state: &Arc<AppState>,
    peer_id: &PeerId,
    self_tx: &PusherChannel,
    text: &str,
) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Unparseable frame from '{}': {}", peer_id, e);
            // Reject to the sender only; a malformed frame is never forwarded
            let error_msg = ErrorMessage {
                r#type: MessageType::Error,
                message: "unrecognized message".to_string(),
            };
            let _ = self_tx.send(serde_json::to_string(&error_msg).unwrap());
            return;
        }
    };

    match msg {
        ClientMessage::SetName { name } => {
            match state.rename_peer_usecase.execute(peer_id, &name).await {
                Ok((effective, targets)) => {
                    let renamed_msg = PeerRenamedMessage {
                        r#type: MessageType::PeerRenamed,
                        peer_id: peer_id.as_str().to_string(),
                        name: effective.into_string(),
                    };
                    let renamed_json = serde_json::to_string(&renamed_msg).unwrap();
                    if let Err(e) = state
                        .rename_peer_usecase
                        .broadcast_renamed(targets, &renamed_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast peer-renamed: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Rename failed for '{}': {}", peer_id, e);
                }
            }
        }
        ClientMessage::GetPeers => {
            let peers = state.list_peers_usecase.execute(peer_id).await;
            let list_msg = PeerListMessage {
                r#type: MessageType::PeerList,
                peers: peers.into_iter().map(PeerInfo::from).collect(),
            };
            let list_json = serde_json::to_string(&list_msg).unwrap();
            if let Err(e) = state.list_peers_usecase.reply(peer_id, &list_json).await {
                tracing::warn!("Failed to reply peer list to '{}': {}", peer_id, e);
            }
        }
        ClientMessage::Offer {
            target_id,
            sdp,
            from_name,
        } => {
            let Ok(target) = PeerId::try_from(target_id) else {
                tracing::debug!("Dropping offer with empty target id from '{}'", peer_id);
                return;
            };
            let offer_msg = RtcOfferMessage {
                r#type: MessageType::RtcOffer,
                from_id: peer_id.as_str().to_string(),
                from_name,
                sdp,
            };
            let offer_json = serde_json::to_string(&offer_msg).unwrap();
            state
                .relay_signal_usecase
                .send_offer(peer_id, &target, &offer_json)
                .await;
        }
        ClientMessage::Answer { target_id, sdp } => {
            let Ok(target) = PeerId::try_from(target_id) else {
                tracing::debug!("Dropping answer with empty target id from '{}'", peer_id);
                return;
            };
            let answer_msg = RtcAnswerMessage {
                r#type: MessageType::RtcAnswer,
                from_id: peer_id.as_str().to_string(),
                sdp,
            };
            let answer_json = serde_json::to_string(&answer_msg).unwrap();
            state
                .relay_signal_usecase
                .send_answer(peer_id, &target, &answer_json)
                .await;
        }
        ClientMessage::Ice {
            target_id,
            candidate,
        } => {
            let Ok(target) = PeerId::try_from(target_id) else {
                tracing::debug!("Dropping ice candidate with empty target id from '{}'", peer_id);
                return;
            };
            let ice_msg = RtcIceMessage {
                r#type: MessageType::RtcIce,
                from_id: peer_id.as_str().to_string(),
                candidate,
            };
            let ice_json = serde_json::to_string(&ice_msg).unwrap();
            state
                .relay_signal_usecase
                .send_ice(peer_id, &target, &ice_json)
                .await;
        }
        ClientMessage::Talking { talking } => {
            match state.set_talking_usecase.execute(peer_id).await {
                Ok((name, targets)) => {
                    let talking_msg = PeerTalkingMessage {
                        r#type: MessageType::PeerTalking,
                        peer_id: peer_id.as_str().to_string(),
                        name: name.into_string(),
                        talking,
                    };
                    let talking_json = serde_json::to_string(&talking_msg).unwrap();
                    if let Err(e) = state
                        .set_talking_usecase
                        .broadcast(targets, &talking_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast peer-talking: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Talking update failed for '{}': {}", peer_id, e);
                }
            }
        }
        ClientMessage::Chat { content } => {
            match state.relay_chat_usecase.send_chat(peer_id).await {
                Ok(stamp) => {
                    let chat_msg = ChatMessage {
                        r#type: MessageType::Chat,
                        from_id: peer_id.as_str().to_string(),
                        from_name: stamp.from_name.into_string(),
                        content,
                        sent_at: format_jst_rfc3339(stamp.sent_at.value()),
                    };
                    let chat_json = serde_json::to_string(&chat_msg).unwrap();
                    if let Err(e) = state
                        .relay_chat_usecase
                        .broadcast(stamp.targets, &chat_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast chat message: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Chat relay failed for '{}': {}", peer_id, e);
                }
            }
        }
        ClientMessage::Typing { typing } => {
            match state.relay_chat_usecase.set_typing(peer_id).await {
                Ok((name, targets)) => {
                    let typing_msg = TypingMessage {
                        r#type: MessageType::Typing,
                        from_id: peer_id.as_str().to_string(),
                        from_name: name.into_string(),
                        typing,
                    };
                    let typing_json = serde_json::to_string(&typing_msg).unwrap();
                    if let Err(e) = state
                        .relay_chat_usecase
                        .broadcast(targets, &typing_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast typing state: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Typing update failed for '{}': {}", peer_id, e);
                }
            }
        }
    }
}
