use super::messages::ServerMessage;
use super::session::{ConnId, HOST_DISCONNECTED, JoinError, PeerHandle, Session};
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info};

/// Which side of a session a connection holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    Host,
    Controller,
}

/// Info returned from a successful join so the caller can notify the host.
#[derive(Debug)]
pub struct JoinedSession {
    pub host: PeerHandle,
}

/// In-memory mapping from game id to pairing session.
///
/// Entry locks give each session single-writer semantics: join, relay and
/// disconnect transitions are applied atomically per game id. Sessions never
/// outlive their entry.
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register `peer` as host of `game_id`, displacing any prior session at
    /// that key. Last write wins, but the displaced session's controller is
    /// told its host is gone rather than being left attached silently.
    pub fn host(&self, game_id: &str, peer: PeerHandle) {
        let session = Session::new(game_id.to_string(), peer);
        let prior = self.sessions.insert(game_id.to_string(), session);
        info!(game_id, "Game hosted");

        if let Some(prior) = prior {
            info!(game_id, "Displaced prior session for re-hosted game id");
            if let Some(controller) = prior.controller() {
                controller.send(ServerMessage::DisconnectController {
                    message: HOST_DISCONNECTED.to_string(),
                });
            }
        }
    }

    /// Attach `peer` as controller of `game_id`. The attach happens under the
    /// entry lock, so two racing joins cannot both win the slot.
    pub fn join(&self, game_id: &str, peer: PeerHandle) -> Result<JoinedSession, JoinError> {
        let Some(mut session) = self.sessions.get_mut(game_id) else {
            return Err(JoinError::InvalidGameId);
        };
        // A host cannot pair with itself; its connection already holds the
        // session, so the slot is not available to it.
        if session.is_host(peer.id) {
            return Err(JoinError::ControllerConnected);
        }
        session.attach_controller(peer)?;
        info!(game_id, "Controller joined");
        Ok(JoinedSession {
            host: session.host.clone(),
        })
    }

    /// Forward `payload` to the peer paired with `sender`. Unknown game ids,
    /// unknown senders, and sessions without a controller drop the message.
    pub fn relay(&self, game_id: &str, sender: ConnId, payload: Value) {
        let Some(session) = self.sessions.get(game_id) else {
            debug!(game_id, "Dropping message for unknown game");
            return;
        };
        let Some(peer) = session.peer_of(sender) else {
            debug!(game_id, "Dropping message with no paired peer");
            return;
        };
        peer.send(ServerMessage::Message { payload });
    }

    /// Tear down `conn`'s side of its session. A host disconnect destroys the
    /// session and notifies the controller; a controller disconnect reopens
    /// the slot and notifies the host.
    pub fn disconnect(&self, game_id: &str, role: Role, conn: ConnId) {
        match role {
            Role::Host => {
                // remove_if guards against a replacement host that re-claimed
                // the key after this connection was displaced.
                let removed = self.sessions.remove_if(game_id, |_, s| s.is_host(conn));
                let Some((_, session)) = removed else {
                    return;
                };
                info!(game_id, "Host disconnected, session closed");
                if let Some(controller) = session.controller() {
                    controller.send(ServerMessage::DisconnectController {
                        message: HOST_DISCONNECTED.to_string(),
                    });
                }
            }
            Role::Controller => {
                let Some(mut session) = self.sessions.get_mut(game_id) else {
                    return;
                };
                if !session.is_controller(conn) {
                    return;
                }
                session.release_controller();
                info!(game_id, "Controller disconnected, slot reopened");
                session.host.send(ServerMessage::ControllerDisconnected);
            }
        }
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.sessions.contains_key(game_id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
