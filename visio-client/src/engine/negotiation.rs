use visio_core::{ClientId, SessionDescription};

/// Lifecycle of the single active pairing.
///
/// The transition into `Connected` is driven by the session's remote-media
/// signal; the engine never computes connectivity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    AwaitingRemoteDescription,
    Connected,
    Closed,
}

/// The one tracked peer.
///
/// Replacing the id bumps the epoch, so work deferred on behalf of an
/// earlier peer can detect it is stale instead of acting on the wrong
/// target.
#[derive(Debug, Default)]
pub(crate) struct PeerSlot {
    pub id: Option<ClientId>,
    pub epoch: u64,
}

impl PeerSlot {
    /// Returns `true` when the slot actually changed. Re-adopting the
    /// current peer keeps the epoch, so candidates queued for it survive.
    pub fn adopt(&mut self, id: ClientId) -> bool {
        if self.id.as_ref() == Some(&id) {
            return false;
        }
        self.id = Some(id);
        self.epoch += 1;
        true
    }

    pub fn is_current(&self, id: &ClientId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Negotiation step postponed until local media acquisition resolves.
#[derive(Debug)]
pub(crate) enum DeferredAction {
    SendOffer {
        target: ClientId,
        epoch: u64,
    },
    SendAnswer {
        offer: SessionDescription,
        target: ClientId,
        epoch: u64,
    },
}

impl DeferredAction {
    pub fn epoch(&self) -> u64 {
        match self {
            DeferredAction::SendOffer { epoch, .. } | DeferredAction::SendAnswer { epoch, .. } => {
                *epoch
            }
        }
    }
}
