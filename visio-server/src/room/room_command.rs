use visio_core::ClientId;

/// Membership changes fed into a room task by the WebSocket layer.
///
/// There is deliberately no explicit leave message in the wire contract; a
/// `Leave` is produced when the client's transport closes.
#[derive(Debug)]
pub enum RoomCommand {
    Join { id: ClientId },
    Leave { id: ClientId },
}
