use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events sent by a connecting peer. `host` and `join` carry the game id the
/// original controller page puts in `gameId`; `message` wraps an arbitrary
/// payload that is relayed without inspection.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Host {
        #[serde(rename = "gameId")]
        game_id: String,
    },
    Join {
        #[serde(rename = "gameId")]
        game_id: String,
    },
    Message {
        payload: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    JoinSuccess,
    DisconnectController { message: String },
    ControllerConnected,
    ControllerDisconnected,
    Message { payload: Value },
}
