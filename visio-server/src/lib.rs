//! Signaling relay for 1:1 calls.
//!
//! The relay never inspects SDP or ICE payloads; it assigns connection ids,
//! tracks room membership, answers every join with the members present at
//! that instant, and forwards negotiation messages to their targets.

pub mod room;
pub mod signaling;

pub use room::{Room, RoomCommand, RoomManager};
pub use signaling::{SignalingOutput, SignalingService, handle_signal, ws_handler};

/// Shared state handed to the WebSocket route.
#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub rooms: RoomManager,
}
