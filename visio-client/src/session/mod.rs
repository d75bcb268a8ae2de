mod rtc;

pub use rtc::RtcPeerSession;

use crate::media::MediaTrack;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use visio_core::{IceCandidate, SdpKind, SessionDescription};

/// Asynchronous signals out of a peer session, delivered on the channel
/// given at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Local connectivity candidate discovered by the ICE agent.
    LocalCandidate(IceCandidate),
    /// Remote media started flowing; the call is effectively connected.
    RemoteMedia,
    /// The transport failed, disconnected, or was closed.
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Contract violation: an answer can only be produced after a remote
    /// offer has been applied.
    #[error("answer requested before a remote offer was applied")]
    AnswerBeforeOffer,
    #[error("expected an {expected} description, got an {got}")]
    DescriptionKind { expected: SdpKind, got: SdpKind },
    #[error("peer session is closed")]
    Closed,
    #[error(transparent)]
    Webrtc(#[from] webrtc::Error),
}

/// The peer-to-peer connection as a capability.
///
/// The negotiation engine drives this interface and nothing else; the native
/// implementation is [`RtcPeerSession`], tests substitute a mock.
#[async_trait]
pub trait PeerSession: Send + Sync {
    /// Attach a local track to the connection, at most once per track.
    /// Returns `false` when the track was already attached.
    async fn attach_track(&self, track: &Arc<MediaTrack>) -> Result<bool, SessionError>;

    async fn create_offer(&self) -> Result<SessionDescription, SessionError>;

    /// Fails fast with [`SessionError::AnswerBeforeOffer`] when no remote
    /// description has been applied yet.
    async fn create_answer(&self) -> Result<SessionDescription, SessionError>;

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), SessionError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), SessionError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
