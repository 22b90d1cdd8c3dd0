//! WebSocket-based preview reload.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::state::AppState;

/// Messages sent to preview pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Reload previews of one site, or all of them
    Reload { client_id: Option<String> },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected previews.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected previews.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Ask previews of a site to reload.
    pub fn reload_site(&self, client_id: &str) {
        self.send(ReloadMessage::Reload {
            client_id: Some(client_id.to_string()),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side reload script for preview pages.
pub fn reload_client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  const ws = new WebSocket(scheme + location.host + '{}');

  ws.onmessage = function(event) {{
    const msg = JSON.parse(event.data);
    if (msg.type !== 'reload') {{
      return;
    }}
    if (!msg.client_id || location.pathname.indexOf('/preview/' + msg.client_id) !== -1) {{
      location.reload();
    }}
  }};

  ws.onclose = function() {{
    console.log('[vitrine] Preview disconnected, retrying...');
    setTimeout(function() {{ location.reload(); }}, 2000);
  }};
}})();
"#,
        ws_path
    )
}

/// Handler for the reload WebSocket endpoint.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.reload().subscribe();
    ws.on_upgrade(move |socket| handle_ws(socket, rx))
}

async fn handle_ws(mut socket: WebSocket, mut rx: broadcast::Receiver<ReloadMessage>) {
    if send_json(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_json(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Preview lagged by {} messages", skipped);
                let all = ReloadMessage::Reload { client_id: None };
                if send_json(&mut socket, &all).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_json(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Handler for the reload client script.
pub async fn script_handler(State(state): State<AppState>) -> impl IntoResponse {
    let path = format!("{}__reload", state.renderer().options().base_url);
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(&path),
    )
}
