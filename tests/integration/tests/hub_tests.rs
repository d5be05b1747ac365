//! Hub Integration Tests
//!
//! Each test starts its own server on an ephemeral port and talks to it
//! over real WebSocket connections.
//!
//! Run with: cargo test -p integration-tests --test hub_tests

use futures_util::SinkExt;
use integration_tests::{assert_status, next_message, next_text, TestServer};
use reqwest::StatusCode;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Operational Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_stats_start_empty() {
    let server = TestServer::start().await.expect("Failed to start server");
    let stats = server.stats().await.unwrap();

    assert_eq!(stats.members, 0);
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.shed, 0);
}

// ============================================================================
// Broadcast Tests
// ============================================================================

#[tokio::test]
async fn test_message_reaches_every_client_including_sender() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(3).await.unwrap();

    clients[0].send(Message::Text("hello".into())).await.unwrap();

    for client in &mut clients {
        assert_eq!(next_text(client).await.unwrap(), "hello");
    }

    let stats = server.wait_for_stats(|s| s.delivered == 3).await.unwrap();
    assert_eq!(stats.members, 3);
    assert_eq!(stats.shed, 0);
}

#[tokio::test]
async fn test_messages_arrive_in_send_order() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    for text in ["one", "two", "three"] {
        clients[0].send(Message::Text(text.into())).await.unwrap();
    }

    // Queued payloads may be merged into one newline-separated frame.
    let mut received = Vec::new();
    while received.len() < 3 {
        let text = next_text(&mut clients[1]).await.unwrap();
        received.extend(text.split('\n').map(str::to_string));
    }
    assert_eq!(received, ["one", "two", "three"]);
}

#[tokio::test]
async fn test_newlines_are_flattened_and_whitespace_trimmed() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    clients[0]
        .send(Message::Text("  first\nsecond  \n".into()))
        .await
        .unwrap();

    assert_eq!(next_text(&mut clients[1]).await.unwrap(), "first second");
}

#[tokio::test]
async fn test_binary_utf8_payload_is_relayed_as_text() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    clients[0]
        .send(Message::Binary(b"from bytes\n".to_vec()))
        .await
        .unwrap();

    assert_eq!(next_text(&mut clients[1]).await.unwrap(), "from bytes");
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[tokio::test]
async fn test_client_close_removes_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    let mut leaving = clients.pop().unwrap();
    leaving.close(None).await.unwrap();

    server.wait_for_members(1).await.unwrap();

    // The remaining client still gets broadcasts.
    clients[0].send(Message::Text("still here".into())).await.unwrap();
    assert_eq!(next_text(&mut clients[0]).await.unwrap(), "still here");
}

#[tokio::test]
async fn test_dropped_connection_removes_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let clients = server.connect_many(2).await.unwrap();

    drop(clients);

    server.wait_for_members(0).await.unwrap();
}

#[tokio::test]
async fn test_oversized_message_closes_only_that_client() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    let oversized = "x".repeat(513);
    // The server may tear the connection down before the write completes.
    let _ = clients[0].send(Message::Text(oversized)).await;

    assert!(next_message(&mut clients[0]).await.unwrap().is_none());
    let stats = server.wait_for_members(1).await.unwrap();
    assert_eq!(stats.delivered, 0);

    clients[1].send(Message::Text("ok".into())).await.unwrap();
    assert_eq!(next_text(&mut clients[1]).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_max_size_message_is_accepted() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut clients = server.connect_many(2).await.unwrap();

    let exact = "y".repeat(512);
    clients[0].send(Message::Text(exact.clone())).await.unwrap();

    assert_eq!(next_text(&mut clients[1]).await.unwrap(), exact);
}
