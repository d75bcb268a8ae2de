//! Local media model.
//!
//! Capturing audio/video is a platform capability and stays outside this
//! crate; negotiation only needs track identities, kinds, and the mute
//! flags. Whatever does the capturing builds a [`MediaStream`] and hands it
//! to the engine.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// One captured track. `enabled` is the mute flag: flipping it is purely
/// local and never touches the signaling channel.
#[derive(Debug)]
pub struct MediaTrack {
    id: TrackId,
    kind: TrackKind,
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl MediaTrack {
    pub fn new(kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            id: TrackId::new(),
            kind,
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, on: bool) {
        self.enabled.store(on, Ordering::Relaxed);
    }

    /// Releases the underlying capture. Irreversible.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Ordered set of local tracks, shared between the engine and the UI side
/// that captured them.
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<MediaTrack>>) -> Self {
        Self { tracks }
    }

    /// A stream with no tracks: a call that can only receive.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Arc<MediaTrack>] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    /// Flips every audio track in place and returns whether any audio track
    /// is enabled afterwards.
    pub fn toggle_audio(&self) -> bool {
        for track in self.audio_tracks() {
            track.set_enabled(!track.is_enabled());
        }
        self.audio_tracks().any(|t| t.is_enabled())
    }

    /// Flips every video track in place and returns whether any video track
    /// is enabled afterwards.
    pub fn toggle_video(&self) -> bool {
        for track in self.video_tracks() {
            track.set_enabled(!track.is_enabled());
        }
        self.video_tracks().any(|t| t.is_enabled())
    }

    /// Stops every track and releases the capture device.
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("camera/microphone access denied")]
    AccessDenied,
    #[error("no capture device available")]
    Unavailable,
}
