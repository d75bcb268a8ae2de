use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of an active signaling connection. Assigned by the relay when
/// the socket is accepted; a reconnecting client gets a fresh one.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the offer/answer exchange a client ends up on.
///
/// The role is determined by join order, never chosen: whoever observes the
/// other side arriving becomes the caller, whoever finds a peer already in
/// the room becomes the callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Caller,
    Callee,
}
