//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, connecting WebSocket
//! clients and polling the hub's counters.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use chat_common::AppConfig;
use chat_hub::{create_app, ClientLimits, Hub, HubState};
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// WebSocket client connected to a test server
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for any single expected event
pub const WAIT: Duration = Duration::from_secs(5);

/// Counters reported by `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Stats {
    pub members: usize,
    pub delivered: u64,
    pub shed: u64,
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
    _hub: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(config.server.address()).await?;
        let addr = listener.local_addr()?;

        let (hub, hub_task) = Hub::spawn(&config.hub);
        let app = create_app(HubState::new(hub, ClientLimits::from(&config.hub)));

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Create HTTP client
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
            _hub: hub_task,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the WebSocket endpoint URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a WebSocket connection to the hub
    pub async fn connect(&self) -> Result<WsClient> {
        let (ws, _response) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .context("WebSocket handshake failed")?;
        Ok(ws)
    }

    /// Open `count` connections and wait until the hub has registered them all
    pub async fn connect_many(&self, count: usize) -> Result<Vec<WsClient>> {
        let mut clients = Vec::with_capacity(count);
        for _ in 0..count {
            clients.push(self.connect().await?);
        }
        self.wait_for_members(count).await?;
        Ok(clients)
    }

    /// Fetch the hub counters
    pub async fn stats(&self) -> Result<Stats> {
        let response = self.get("/stats").await?;
        assert_json(response, StatusCode::OK).await
    }

    /// Poll `/stats` until the member count equals `expected`
    pub async fn wait_for_members(&self, expected: usize) -> Result<Stats> {
        self.wait_for_stats(|stats| stats.members == expected)
            .await
            .with_context(|| format!("hub never reached {expected} members"))
    }

    /// Poll `/stats` until `predicate` holds
    pub async fn wait_for_stats<P>(&self, predicate: P) -> Result<Stats>
    where
        P: Fn(&Stats) -> bool,
    {
        let poll = async {
            loop {
                let stats = self.stats().await?;
                if predicate(&stats) {
                    return Ok::<_, anyhow::Error>(stats);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(WAIT, poll)
            .await
            .context("timed out polling /stats")?
    }
}

/// Create a test configuration: defaults, bound to an ephemeral local port
pub fn test_config() -> Result<AppConfig> {
    let mut config = AppConfig::from_lookup(|_| None)
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    Ok(config)
}

/// Next data message from the server, skipping control frames
///
/// Returns `None` once the server closes the connection.
pub async fn next_message(ws: &mut WsClient) -> Result<Option<Message>> {
    let read = async {
        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(message) => return Some(message),
            }
        }
        None
    };
    tokio::time::timeout(WAIT, read)
        .await
        .context("timed out waiting for a message")
}

/// Next text message from the server
pub async fn next_text(ws: &mut WsClient) -> Result<String> {
    match next_message(ws).await? {
        Some(Message::Text(text)) => Ok(text),
        Some(other) => anyhow::bail!("Expected a text message, got {other:?}"),
        None => anyhow::bail!("Connection closed while waiting for text"),
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: serde::de::DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
