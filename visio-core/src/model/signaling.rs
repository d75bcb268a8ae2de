use crate::model::ice::{IceCandidate, IceServerConfig};
use crate::model::peer::ClientId;
use crate::model::room::RoomId;
use crate::model::sdp::SessionDescription;
use serde::{Deserialize, Serialize};

/// Messages a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    JoinRoom {
        room: RoomId,
    },
    Offer {
        description: SessionDescription,
        target: ClientId,
    },
    Answer {
        description: SessionDescription,
        target: ClientId,
    },
    IceCandidate {
        candidate: IceCandidate,
        target: ClientId,
    },
}

/// Messages the relay sends to a client.
///
/// `ExistingUsers` goes only to a freshly joined client and `UserJoined` only
/// to clients already present; the relay guarantees that at most one of the
/// two fires per side of a pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    Welcome {
        id: ClientId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    ExistingUsers {
        users: Vec<ClientId>,
    },
    UserJoined {
        id: ClientId,
    },
    Offer {
        description: SessionDescription,
        from: ClientId,
    },
    Answer {
        description: SessionDescription,
    },
    IceCandidate {
        candidate: IceCandidate,
    },
}
