#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use ladle_api::auth::verifier::Claims;
use ladle_api::config::Config;
use ladle_api::AppState;
use ladle_common::Recipe;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Secret shared between the test "auth service" and the server under test.
pub const TEST_SECRET: &str = "ladle-test-secret";

pub fn test_config() -> Config {
    Config {
        jwt_secret: TEST_SECRET.to_string(),
        port: 0,
        client_url: None,
    }
}

/// Start a real server on an ephemeral port. Returns its address and the
/// state, so tests can reach the store and router directly.
pub async fn start_server() -> (SocketAddr, AppState) {
    let state = AppState::new(test_config());
    let app = ladle_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Mint a bearer token the way the (out-of-scope) auth service would.
pub fn mint_token(user_id: &str) -> String {
    mint_token_with_exp(user_id, chrono::Utc::now().timestamp() + 3600)
}

/// Mint a token that expired well past the verifier's leeway.
pub fn mint_expired_token(user_id: &str) -> String {
    mint_token_with_exp(user_id, chrono::Utc::now().timestamp() - 3600)
}

fn mint_token_with_exp(user_id: &str, exp: i64) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: user_id.to_string(),
            exp,
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("mint token")
}

pub async fn seed_recipe(state: &AppState, owner_id: &str, title: &str) -> Recipe {
    state
        .recipes
        .create_recipe(owner_id, title)
        .await
        .expect("seed recipe")
}

/// Open a realtime connection to the server.
pub async fn connect_ws(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("ws connect");
    ws
}

pub async fn send_json(ws: &mut WsStream, value: serde_json::Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("ws send");
}

pub async fn join_room(ws: &mut WsStream, room_id: &str) {
    send_json(ws, serde_json::json!({ "type": "join", "roomId": room_id })).await;
}

/// Read the next text frame as JSON, failing the test after 5 seconds.
pub async fn recv_json(ws: &mut WsStream) -> serde_json::Value {
    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for ws message")
        .expect("ws stream ended")
        .expect("ws read error");
    let text = msg.into_text().expect("not a text frame");
    serde_json::from_str(&text).expect("invalid json from server")
}

/// Assert that nothing arrives on this connection for a short window.
pub async fn assert_silent(ws: &mut WsStream) {
    if let Ok(msg) = time::timeout(Duration::from_millis(250), ws.next()).await {
        panic!("expected no message, got {msg:?}");
    }
}

/// Poll until `cond` holds; joins and disconnects are handled asynchronously
/// by the server, so tests wait for the router to catch up instead of racing
/// it.
pub async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
