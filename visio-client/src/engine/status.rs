use visio_core::ClientId;

/// User actions fed into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    ToggleMic,
    ToggleCam,
    HangUp,
}

/// User-visible progress of the call, emitted as the state machine moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    /// The relay assigned us an id.
    Registered(ClientId),
    /// Joined the room, nobody else there yet.
    Alone,
    /// A peer was already present; we are the callee and wait for its offer.
    PeerPresent(ClientId),
    /// A peer arrived after us; we are the caller.
    Calling(ClientId),
    IncomingCall(ClientId),
    /// Remote media is flowing.
    Connected,
    MicEnabled(bool),
    CamEnabled(bool),
    /// Media acquisition failed; the call continues without local tracks.
    MediaUnavailable,
    ChannelLost,
    Ended,
}
