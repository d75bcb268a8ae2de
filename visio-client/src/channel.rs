use tokio::sync::mpsc;
use tracing::{debug, warn};
use visio_core::ClientMessage;

/// Outbound half of the signaling connection.
///
/// The transport itself (WebSocket or otherwise) lives outside the core; the
/// engine only needs somewhere to push contract messages. A closed or dropped
/// transport downgrades sends to logged no-ops so a signaling failure never
/// unwinds into an event handler.
pub struct SignalingChannel {
    tx: mpsc::UnboundedSender<ClientMessage>,
    open: bool,
}

impl SignalingChannel {
    pub fn new(tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self { tx, open: true }
    }

    pub fn is_open(&self) -> bool {
        self.open && !self.tx.is_closed()
    }

    /// Returns whether the transport accepted the message.
    pub fn send(&self, msg: ClientMessage) -> bool {
        if !self.open {
            debug!("signaling channel closed; dropping message");
            return false;
        }
        if self.tx.send(msg).is_err() {
            warn!("signaling transport disconnected; dropping message");
            return false;
        }
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}
