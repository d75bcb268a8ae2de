pub mod model;

pub use model::{
    ClientId, ClientMessage, IceCandidate, IceServerConfig, PeerRole, RoomId, SdpKind,
    ServerMessage, SessionDescription,
};
