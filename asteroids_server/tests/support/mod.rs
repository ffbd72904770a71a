// Boots one game server per test binary and hands out a client connection to it.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

static WS_URL: OnceLock<String> = OnceLock::new();

/// Starts the server on first use and returns its `ws://` URL.
pub fn ensure_server() -> &'static str {
    WS_URL.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // The server gets its own thread and runtime so it outlives each `#[tokio::test]`.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                asteroids_server::run(listener).await.expect("server failed");
            });
        });

        let addr = wait_for_address(&published);
        wait_until_accepting(&addr);
        format!("ws://{addr}/ws")
    })
}

fn wait_for_address(published: &OnceLock<String>) -> String {
    loop {
        if let Some(addr) = published.get() {
            return addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn wait_until_accepting(addr: &str) {
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub async fn connect() -> Client {
    let (client, _response) = connect_async(ensure_server())
        .await
        .expect("websocket handshake");
    client
}

/// Next text frame parsed as JSON. Panics on timeout or a closed socket.
pub async fn next_json(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a message")
            .expect("socket closed")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("server sent valid json");
        }
    }
}

/// Skips packets until one matches `pred`.
pub async fn next_matching(client: &mut Client, pred: impl Fn(&Value) -> bool) -> Value {
    loop {
        let value = next_json(client).await;
        if pred(&value) {
            return value;
        }
    }
}

pub async fn send_text(client: &mut Client, text: &str) {
    client
        .send(Message::Text(text.into()))
        .await
        .expect("send text frame");
}
