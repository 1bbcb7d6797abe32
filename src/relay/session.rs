use super::messages::ServerMessage;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Reasons sent with `disconnect-controller`. The exact wording is part of
/// the wire contract with the controller page.
pub const INVALID_GAME_ID: &str = "The game ID is invalid.";
pub const CONTROLLER_CONNECTED: &str = "Another controller is connected.";
pub const HOST_DISCONNECTED: &str = "The game host has disconnected.";

/// Stable identity of one connection, minted when the socket is accepted.
/// Sessions compare these ids to resolve message direction.
pub type ConnId = Uuid;

/// Non-owning handle to a connected peer: its identity plus the outbound
/// channel drained by that connection's send task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    pub id: ConnId,
    pub tx: broadcast::Sender<ServerMessage>,
}

impl PeerHandle {
    pub fn new(id: ConnId, tx: broadcast::Sender<ServerMessage>) -> Self {
        Self { id, tx }
    }

    /// Fire-and-forget emit. A send error means the peer's send task is
    /// already gone; teardown is handled by that connection's close path.
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}

#[derive(Debug, PartialEq)]
pub enum JoinError {
    InvalidGameId,
    ControllerConnected,
}

impl JoinError {
    pub fn reason(&self) -> &'static str {
        match self {
            JoinError::InvalidGameId => INVALID_GAME_ID,
            JoinError::ControllerConnected => CONTROLLER_CONNECTED,
        }
    }
}

/// Pairing state for one game id (pure logic, no I/O).
///
/// The host is fixed at creation; the controller slot may empty and refill
/// any number of times while the host stays connected.
pub struct Session {
    pub game_id: String,
    pub host: PeerHandle,
    controller: Option<PeerHandle>,
}

impl Session {
    pub fn new(game_id: String, host: PeerHandle) -> Self {
        Self {
            game_id,
            host,
            controller: None,
        }
    }

    pub fn controller(&self) -> Option<&PeerHandle> {
        self.controller.as_ref()
    }

    pub fn is_paired(&self) -> bool {
        self.controller.is_some()
    }

    /// Attach a controller. Fails while the slot is occupied.
    pub fn attach_controller(&mut self, peer: PeerHandle) -> Result<(), JoinError> {
        if self.controller.is_some() {
            return Err(JoinError::ControllerConnected);
        }
        self.controller = Some(peer);
        Ok(())
    }

    /// Detach the controller, returning the session to its awaiting state.
    pub fn release_controller(&mut self) -> Option<PeerHandle> {
        self.controller.take()
    }

    pub fn is_host(&self, id: ConnId) -> bool {
        self.host.id == id
    }

    pub fn is_controller(&self, id: ConnId) -> bool {
        self.controller.as_ref().is_some_and(|c| c.id == id)
    }

    /// Relay target for a message from `sender`: host messages go to the
    /// controller and vice versa. None while unpaired or when the sender is
    /// neither peer.
    pub fn peer_of(&self, sender: ConnId) -> Option<&PeerHandle> {
        let controller = self.controller.as_ref()?;
        if sender == self.host.id {
            Some(controller)
        } else if sender == controller.id {
            Some(&self.host)
        } else {
            None
        }
    }
}
