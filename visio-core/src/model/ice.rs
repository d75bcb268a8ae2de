use serde::{Deserialize, Serialize};

/// One connectivity candidate, as produced by trickle ICE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// STUN/TURN server descriptor. Deployment of these servers is out of scope;
/// their addresses are configuration inputs only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}
