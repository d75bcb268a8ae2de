use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};
use visio_core::{ClientId, IceServerConfig, ServerMessage};

struct SignalingInner {
    peers: DashMap<ClientId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Registry of connected sockets; routes a [`ServerMessage`] to the send
/// task of one client.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, id: ClientId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(id, tx);
    }

    pub fn remove_peer(&self, id: &ClientId) {
        self.inner.peers.remove(id);
    }

    /// Sending to an id that already disconnected is expected during
    /// teardown races and only logged.
    pub fn send_signal(&self, to: &ClientId, msg: ServerMessage) {
        if let Some(peer) = self.inner.peers.get(to) {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!(to = %to, error = %e, "failed to push message to socket task");
                    }
                }
                Err(e) => error!(error = %e, "failed to serialize server message"),
            }
        } else {
            warn!(to = %to, "signal for a disconnected client; dropping");
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_existing_users(&self, to: ClientId, users: Vec<ClientId>) {
        self.send_signal(&to, ServerMessage::ExistingUsers { users });
    }

    async fn send_user_joined(&self, to: ClientId, id: ClientId) {
        self.send_signal(&to, ServerMessage::UserJoined { id });
    }
}
