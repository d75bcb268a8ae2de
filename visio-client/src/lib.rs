//! Client-side negotiation core for 1:1 calls.
//!
//! The engine in [`engine`] owns the whole signaling state machine: role
//! discovery through a shared room, offer/answer sequencing, trickle-ICE
//! queueing, and teardown. Everything platform-specific is behind a seam:
//! the peer connection is a [`session::PeerSession`] capability and the
//! signaling transport is a [`channel::SignalingChannel`] over plain
//! channels.

pub mod channel;
pub mod engine;
pub mod media;
pub mod session;

pub use channel::SignalingChannel;
pub use engine::{CallCommand, CallEngine, CallStatus, EngineChannels, NegotiationState};
pub use media::{MediaError, MediaStream, MediaTrack, TrackId, TrackKind};
pub use session::{PeerSession, RtcPeerSession, SessionError, SessionEvent};
