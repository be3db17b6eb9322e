use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::Message;

use crate::input::Control;
use crate::state::{ServerMessage, SharedGameState};
use crate::track::TrackGeometry;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Key { control: Control, active: bool },
    Ping,
}

impl ClientMessage {
    fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }
}

pub async fn start_websocket_server(
    addr: SocketAddr,
    state: Arc<Mutex<SharedGameState>>,
    track: Arc<TrackGeometry>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind WebSocket port {addr}"))?;

    info!("🌐 WebSocket listening on ws://{addr}");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };

        let state = Arc::clone(&state);
        let track = Arc::clone(&track);

        tokio::spawn(async move {
            if let Err(err) = handle_client(raw, peer, state, track).await {
                warn!(%peer, "client session ended with error: {err:#}");
            }
        });
    }
}

async fn handle_client(
    raw: TcpStream,
    peer: SocketAddr,
    state: Arc<Mutex<SharedGameState>>,
    track: Arc<TrackGeometry>,
) -> anyhow::Result<()> {
    let ws = accept_async(raw).await.context("websocket handshake")?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Register + welcome (track is sent once per client)
    // -------------------------------
    let client_id = state.lock().await.register_client(tx.clone());
    info!(%client_id, %peer, "🟢 driver connected");

    if let Some(welcome) = (ServerMessage::Welcome { client_id, track: &track }).to_json() {
        let _ = tx.send(welcome);
    }

    // -------------------------------
    // 3) Receive loop: key levels into the shared KeyState
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                debug!(%client_id, %err, "read error");
                break;
            }
        };

        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        match ClientMessage::from_json(&text) {
            Some(ClientMessage::Key { control, active }) => {
                state.lock().await.set_key(&client_id, control, active);
            }
            Some(ClientMessage::Ping) => {
                if let Some(pong) = ServerMessage::Pong.to_json() {
                    let _ = tx.send(pong);
                }
            }
            None => warn!(%client_id, "ignoring malformed message"),
        }
    }

    info!(%client_id, "🔴 driver disconnected");
    state.lock().await.remove_client(&client_id);

    Ok(())
}
