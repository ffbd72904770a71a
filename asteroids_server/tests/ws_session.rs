mod support;

use futures::StreamExt;
use tokio_tungstenite::tungstenite::{Message, protocol::frame::coding::CloseCode};

#[tokio::test]
async fn when_client_connects_then_it_receives_its_id_first() {
    let mut client = support::connect().await;

    let hello = support::next_json(&mut client).await;

    assert_eq!(hello["cmd"], "id");
    assert!(hello["id"].as_u64().is_some());
}

#[tokio::test]
async fn when_two_clients_connect_then_ids_differ() {
    let mut first = support::connect().await;
    let mut second = support::connect().await;

    let a = support::next_json(&mut first).await;
    let b = support::next_json(&mut second).await;

    assert_ne!(a["id"], b["id"]);
}

#[tokio::test]
async fn when_client_accelerates_then_world_packets_track_its_ship() {
    let mut client = support::connect().await;
    support::next_json(&mut client).await;

    support::send_text(&mut client, r#"{"command":"accelerate","arg":true}"#).await;

    let packet = support::next_matching(&mut client, |v| {
        v["cmd"] == "world" && v.get("viewport").is_some()
    })
    .await;
    let viewport = &packet["viewport"];
    assert_eq!(viewport["world_size"], 500.0);
    assert_eq!(viewport["view_size"], 300.0);
    assert!(packet["timestamp"].as_u64().is_some());
    let objects = packet["objects"].as_object().expect("objects map");
    assert!(objects.len() <= 10);
    assert!(objects.values().all(|o| o["type"].is_string()));

    // Thrust spawns engine particles every tick it is held.
    support::next_matching(&mut client, |v| v.get("new_particles").is_some()).await;
}

#[tokio::test]
async fn when_client_sends_too_many_invalid_messages_then_it_is_closed_with_policy() {
    let mut client = support::connect().await;
    support::next_json(&mut client).await;

    for _ in 0..11 {
        support::send_text(&mut client, r#"{"command":"warp","arg":true}"#).await;
    }

    let close = loop {
        let message = tokio::time::timeout(support::RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for close")
            .expect("socket ended without close frame")
            .expect("websocket error");
        if let Message::Close(frame) = message {
            break frame;
        }
    };
    let frame = close.expect("close frame carries a code");
    assert_eq!(frame.code, CloseCode::Policy);
}
