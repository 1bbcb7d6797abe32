use futures_util::StreamExt;
use padlink::messages::{ClientMessage, ServerMessage};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestServer {
    base_url: String,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url)
    }
}

pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, padlink::app()).await.unwrap();
    });

    TestServer {
        base_url: format!("ws://{}", addr),
    }
}

pub async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(&server.ws_url()).await.expect("Failed to connect");
    ws
}

pub fn host_msg(game_id: &str) -> Message {
    let json = serde_json::to_string(&ClientMessage::Host {
        game_id: game_id.to_string(),
    })
    .unwrap();
    Message::Text(json.into())
}

pub fn join_msg(game_id: &str) -> Message {
    let json = serde_json::to_string(&ClientMessage::Join {
        game_id: game_id.to_string(),
    })
    .unwrap();
    Message::Text(json.into())
}

pub fn relay_msg(payload: serde_json::Value) -> Message {
    let json = serde_json::to_string(&ClientMessage::Message { payload }).unwrap();
    Message::Text(json.into())
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    let msg = ws.next().await.unwrap().unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}
