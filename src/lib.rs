pub mod relay;

pub use relay::messages;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    response::Response,
    routing::get,
};
use relay::SessionRegistry;
use std::sync::Arc;

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<SessionRegistry>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    relay::handle_connection(socket, state.relay).await;
}

pub fn app() -> Router {
    let state = AppState {
        relay: Arc::new(SessionRegistry::new()),
    };

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .with_state(state)
}
