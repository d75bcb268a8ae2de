mod ice;
mod peer;
mod room;
mod sdp;
mod signaling;

pub use ice::{IceCandidate, IceServerConfig};
pub use peer::{ClientId, PeerRole};
pub use room::RoomId;
pub use sdp::{SdpKind, SessionDescription};
pub use signaling::{ClientMessage, ServerMessage};
