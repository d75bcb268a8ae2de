use async_trait::async_trait;
use visio_core::ClientId;

/// How a room task reaches clients. Implemented by the WebSocket layer in
/// production and by a capture mock in tests.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Role discovery for a freshly joined client: everyone already present,
    /// in join order. Sent only to the joiner.
    async fn send_existing_users(&self, to: ClientId, users: Vec<ClientId>);

    /// Arrival notification, sent only to clients already in the room.
    async fn send_user_joined(&self, to: ClientId, id: ClientId);
}
