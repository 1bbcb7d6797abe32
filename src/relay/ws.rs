use super::messages::{ClientMessage, ServerMessage};
use super::registry::{Role, SessionRegistry};
use super::session::{ConnId, PeerHandle};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-connection record: stable identity plus the session this connection
/// is attached to, if any. Set on `host`/`join`, consulted on `message` and
/// on close.
pub struct ConnectionContext {
    pub conn_id: ConnId,
    pub attachment: Option<Attachment>,
}

pub struct Attachment {
    pub game_id: String,
    pub role: Role,
}

impl ConnectionContext {
    pub fn new() -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            attachment: None,
        }
    }
}

impl Default for ConnectionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one WebSocket connection: split the socket, drain a broadcast channel
/// into the send half, dispatch inbound events, and tear down the session
/// side on close.
pub async fn handle_connection(socket: WebSocket, registry: Arc<SessionRegistry>) {
    info!("New WebSocket connection");
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = broadcast::channel::<ServerMessage>(16);

    // Task to send messages from the broadcast channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            debug!(?msg, "Sending message to client");
            let json = serde_json::to_string(&msg).unwrap();
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Task to receive messages from the WebSocket and dispatch to the
    // registry. The loop tears down this connection's session side itself
    // when the read half closes, so teardown runs even when the send half
    // dies first and the select below completes on its arm.
    let recv_task = tokio::spawn(receive_loop(receiver, tx, registry));

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("WebSocket connection closed");
}

async fn receive_loop(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    tx: broadcast::Sender<ServerMessage>,
    registry: Arc<SessionRegistry>,
) {
    let mut ctx = ConnectionContext::new();

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            debug!("Received non-text message, ignoring");
            continue;
        };

        debug!(raw = %text, "Received message");

        let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else {
            warn!(raw = %text, "Failed to parse client message");
            continue;
        };

        handle_message(client_msg, &tx, &registry, &mut ctx);
    }

    // Transport closed: tear down this connection's side of its session.
    detach(&registry, &mut ctx);
}

fn handle_message(
    msg: ClientMessage,
    tx: &broadcast::Sender<ServerMessage>,
    registry: &SessionRegistry,
    ctx: &mut ConnectionContext,
) {
    match msg {
        ClientMessage::Host { game_id } => {
            // A connection that was already attached leaves its old session
            // before claiming the new one.
            detach(registry, ctx);
            registry.host(&game_id, PeerHandle::new(ctx.conn_id, tx.clone()));
            ctx.attachment = Some(Attachment {
                game_id,
                role: Role::Host,
            });
        }
        ClientMessage::Join { game_id } => match registry.join(
            &game_id,
            PeerHandle::new(ctx.conn_id, tx.clone()),
        ) {
            Ok(joined) => {
                detach(registry, ctx);
                let _ = tx.send(ServerMessage::JoinSuccess);
                joined.host.send(ServerMessage::ControllerConnected);
                ctx.attachment = Some(Attachment {
                    game_id,
                    role: Role::Controller,
                });
            }
            Err(err) => {
                // Pairing failures surface to the joining peer only; a
                // rejected join leaves any existing attachment untouched.
                let _ = tx.send(ServerMessage::DisconnectController {
                    message: err.reason().to_string(),
                });
            }
        },
        ClientMessage::Message { payload } => {
            let Some(att) = &ctx.attachment else {
                debug!("Dropping message from unattached connection");
                return;
            };
            registry.relay(&att.game_id, ctx.conn_id, payload);
        }
    }
}

fn detach(registry: &SessionRegistry, ctx: &mut ConnectionContext) {
    if let Some(att) = ctx.attachment.take() {
        registry.disconnect(&att.game_id, att.role, ctx.conn_id);
    }
}
