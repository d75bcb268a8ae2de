use crate::channel::SignalingChannel;
use crate::engine::negotiation::{DeferredAction, NegotiationState, PeerSlot};
use crate::engine::status::{CallCommand, CallStatus};
use crate::media::{MediaError, MediaStream};
use crate::session::{PeerSession, SessionError, SessionEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use visio_core::{
    ClientId, ClientMessage, IceCandidate, PeerRole, RoomId, SdpKind, ServerMessage,
    SessionDescription,
};

/// Everything the engine talks to: the signaling transport in both
/// directions, the session's event stream, the media-acquisition result, and
/// the user-facing command/status pair.
pub struct EngineChannels {
    pub outbound: SignalingChannel,
    pub server_rx: mpsc::Receiver<ServerMessage>,
    pub session_rx: mpsc::Receiver<SessionEvent>,
    pub media_rx: mpsc::Receiver<Result<MediaStream, MediaError>>,
    pub command_rx: mpsc::Receiver<CallCommand>,
    pub status_tx: mpsc::UnboundedSender<CallStatus>,
}

/// Per-client negotiation state machine for a 1:1 call.
///
/// One task owns all mutable state; every signaling event, session event,
/// and user command is handled as a discrete reaction inside [`run`]'s
/// select loop, so no locking is needed. The pairing is strictly one peer:
/// the room may report more members, but only the first is ever tracked.
///
/// [`run`]: CallEngine::run
pub struct CallEngine<S: PeerSession> {
    room: RoomId,
    session: S,
    channel: SignalingChannel,
    server_rx: mpsc::Receiver<ServerMessage>,
    session_rx: mpsc::Receiver<SessionEvent>,
    media_rx: mpsc::Receiver<Result<MediaStream, MediaError>>,
    command_rx: mpsc::Receiver<CallCommand>,
    status_tx: mpsc::UnboundedSender<CallStatus>,

    peer: PeerSlot,
    role: Option<PeerRole>,
    state: NegotiationState,
    remote_description_set: bool,
    pending_candidates: Vec<IceCandidate>,
    media: Option<MediaStream>,
    media_pending: bool,
    deferred: Option<DeferredAction>,
    session_events_done: bool,
    closing: bool,
}

impl<S: PeerSession> CallEngine<S> {
    pub fn new(room: RoomId, session: S, channels: EngineChannels) -> Self {
        Self {
            room,
            session,
            channel: channels.outbound,
            server_rx: channels.server_rx,
            session_rx: channels.session_rx,
            media_rx: channels.media_rx,
            command_rx: channels.command_rx,
            status_tx: channels.status_tx,
            peer: PeerSlot::default(),
            role: None,
            state: NegotiationState::Idle,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            media: None,
            media_pending: true,
            deferred: None,
            session_events_done: false,
            closing: false,
        }
    }

    /// Joins the room and reacts to events until hang-up, channel loss, or
    /// session close, then tears everything down.
    pub async fn run(mut self) {
        info!(room = %self.room, "call engine started");

        self.channel.send(ClientMessage::JoinRoom {
            room: self.room.clone(),
        });

        while !self.closing {
            tokio::select! {
                msg = self.server_rx.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg).await,
                    None => {
                        warn!("signaling stream ended");
                        self.emit(CallStatus::ChannelLost);
                        self.closing = true;
                    }
                },
                evt = self.session_rx.recv(), if !self.session_events_done => match evt {
                    Some(evt) => self.handle_session_event(evt).await,
                    None => self.session_events_done = true,
                },
                res = self.media_rx.recv(), if self.media_pending => {
                    self.handle_media_result(res).await;
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => self.closing = true,
                },
            }
        }

        self.teardown().await;
    }

    async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { id } => {
                debug!(id = %id, "registered with relay");
                self.emit(CallStatus::Registered(id));
            }
            ServerMessage::IceConfig { ice_servers } => {
                debug!(count = ice_servers.len(), "relay advertised ICE servers");
            }
            ServerMessage::ExistingUsers { users } => self.handle_existing_users(users),
            ServerMessage::UserJoined { id } => self.handle_user_joined(id).await,
            ServerMessage::Offer { description, from } => {
                self.handle_offer(description, from).await;
            }
            ServerMessage::Answer { description } => {
                if let Err(e) = self.apply_answer(description).await {
                    error!(error = %e, "failed to apply remote answer");
                }
            }
            ServerMessage::IceCandidate { candidate } => {
                self.handle_remote_candidate(candidate).await;
            }
        }
    }

    fn handle_existing_users(&mut self, users: Vec<ClientId>) {
        let Some(first) = users.first().cloned() else {
            info!("alone in the room; waiting for a peer");
            self.emit(CallStatus::Alone);
            return;
        };

        if users.len() > 1 {
            // the call model is strictly 1:1; extra members are not paired
            warn!(
                ignored = users.len() - 1,
                "room already has multiple members; pairing with the first only"
            );
        }

        self.adopt_peer(first.clone(), PeerRole::Callee);
        info!(peer = %first, "peer already present; waiting for an offer");
        self.emit(CallStatus::PeerPresent(first));
    }

    async fn handle_user_joined(&mut self, id: ClientId) {
        self.adopt_peer(id.clone(), PeerRole::Caller);
        info!(peer = %id, "peer joined; initiating call");
        self.emit(CallStatus::Calling(id.clone()));

        match self.media.clone() {
            Some(stream) => {
                if let Err(e) = self.send_offer(&stream, id).await {
                    error!(error = %e, "failed to create offer");
                }
            }
            None => {
                self.deferred = Some(DeferredAction::SendOffer {
                    target: id,
                    epoch: self.peer.epoch,
                });
            }
        }
    }

    async fn handle_offer(&mut self, description: SessionDescription, from: ClientId) {
        self.adopt_peer(from.clone(), PeerRole::Callee);
        info!(peer = %from, "incoming offer");
        self.emit(CallStatus::IncomingCall(from.clone()));

        match self.media.clone() {
            Some(stream) => {
                if let Err(e) = self.send_answer(description, &stream, from).await {
                    error!(error = %e, "failed to create answer");
                }
            }
            None => {
                self.deferred = Some(DeferredAction::SendAnswer {
                    offer: description,
                    target: from,
                    epoch: self.peer.epoch,
                });
            }
        }
    }

    /// Tracks `id` as the active peer. A genuinely new peer invalidates
    /// everything accumulated for the previous one: queued candidates,
    /// deferred work, and the remote description.
    fn adopt_peer(&mut self, id: ClientId, role: PeerRole) {
        self.role = Some(role);
        if !self.peer.adopt(id) {
            return;
        }

        self.state = NegotiationState::AwaitingRemoteDescription;
        self.remote_description_set = false;
        self.pending_candidates.clear();
        self.deferred = None;
    }

    async fn send_offer(
        &mut self,
        stream: &MediaStream,
        target: ClientId,
    ) -> Result<(), SessionError> {
        if !self.peer.is_current(&target) {
            debug!(target = %target, "offer target no longer current; discarding");
            return Ok(());
        }

        self.attach_local_tracks(stream).await?;

        let offer = self.session.create_offer().await?;
        self.session.set_local_description(offer.clone()).await?;

        if !self.channel.send(ClientMessage::Offer {
            description: offer,
            target: target.clone(),
        }) {
            warn!(target = %target, "signaling channel down; offer not sent");
        } else {
            debug!(target = %target, "offer sent");
        }
        Ok(())
    }

    async fn send_answer(
        &mut self,
        offer: SessionDescription,
        stream: &MediaStream,
        target: ClientId,
    ) -> Result<(), SessionError> {
        if !self.peer.is_current(&target) {
            debug!(target = %target, "answer target no longer current; discarding");
            return Ok(());
        }
        if offer.kind != SdpKind::Offer {
            return Err(SessionError::DescriptionKind {
                expected: SdpKind::Offer,
                got: offer.kind,
            });
        }

        self.attach_local_tracks(stream).await?;

        // The remote offer must be applied before the answer is produced;
        // the session fails fast if this order is ever violated.
        self.session.set_remote_description(offer).await?;
        self.flush_pending_candidates().await;

        let answer = self.session.create_answer().await?;
        self.session.set_local_description(answer.clone()).await?;

        if !self.channel.send(ClientMessage::Answer {
            description: answer,
            target: target.clone(),
        }) {
            warn!(target = %target, "signaling channel down; answer not sent");
        } else {
            debug!(target = %target, "answer sent");
        }
        Ok(())
    }

    async fn apply_answer(&mut self, description: SessionDescription) -> Result<(), SessionError> {
        if self.state == NegotiationState::Closed {
            debug!("answer received after teardown; discarding");
            return Ok(());
        }
        if self.peer.id.is_none() {
            debug!("answer with no active pairing; discarding");
            return Ok(());
        }
        if self.role != Some(PeerRole::Caller) {
            debug!("answer received while not the caller; discarding");
            return Ok(());
        }
        if description.kind != SdpKind::Answer {
            return Err(SessionError::DescriptionKind {
                expected: SdpKind::Answer,
                got: description.kind,
            });
        }

        self.session.set_remote_description(description).await?;
        self.flush_pending_candidates().await;
        Ok(())
    }

    async fn handle_remote_candidate(&mut self, candidate: IceCandidate) {
        if self.peer.id.is_none() {
            debug!("candidate with no active pairing; discarding");
            return;
        }

        if self.remote_description_set {
            if let Err(e) = self.session.add_ice_candidate(candidate).await {
                warn!(error = %e, "failed to apply ICE candidate");
            }
        } else {
            // candidates cannot be applied before the remote description
            // exists; they are flushed in arrival order once it lands
            self.pending_candidates.push(candidate);
        }
    }

    async fn flush_pending_candidates(&mut self) {
        self.remote_description_set = true;
        if self.pending_candidates.is_empty() {
            return;
        }

        debug!(
            count = self.pending_candidates.len(),
            "flushing queued ICE candidates"
        );
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.session.add_ice_candidate(candidate).await {
                warn!(error = %e, "failed to apply queued ICE candidate");
            }
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LocalCandidate(candidate) => match self.peer.id.clone() {
                Some(target) => {
                    if !self.channel.send(ClientMessage::IceCandidate { candidate, target }) {
                        warn!("signaling channel down; candidate not sent");
                    }
                }
                None => debug!("local candidate with no tracked peer; dropping"),
            },
            SessionEvent::RemoteMedia => {
                info!("remote media available");
                self.state = NegotiationState::Connected;
                self.emit(CallStatus::Connected);
            }
            SessionEvent::Closed => {
                info!("peer session closed");
                self.closing = true;
            }
        }
    }

    async fn handle_media_result(&mut self, result: Option<Result<MediaStream, MediaError>>) {
        self.media_pending = false;

        match result {
            Some(Ok(stream)) => self.media = Some(stream),
            Some(Err(e)) => {
                // reported, not fatal: the call can still receive
                warn!(error = %e, "local media unavailable; continuing without tracks");
                self.emit(CallStatus::MediaUnavailable);
                self.media = Some(MediaStream::empty());
            }
            None => {
                warn!("media acquisition abandoned; continuing without tracks");
                self.media = Some(MediaStream::empty());
            }
        }

        let Some(action) = self.deferred.take() else {
            return;
        };
        if action.epoch() != self.peer.epoch {
            debug!("deferred negotiation step targets a replaced peer; discarding");
            return;
        }

        let stream = self.media.clone().unwrap_or_default();
        let result = match action {
            DeferredAction::SendOffer { target, .. } => self.send_offer(&stream, target).await,
            DeferredAction::SendAnswer { offer, target, .. } => {
                self.send_answer(offer, &stream, target).await
            }
        };
        if let Err(e) = result {
            error!(error = %e, "deferred negotiation step failed");
        }
    }

    fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::ToggleMic => {
                if let Some(media) = &self.media {
                    let on = media.toggle_audio();
                    self.emit(CallStatus::MicEnabled(on));
                }
            }
            CallCommand::ToggleCam => {
                if let Some(media) = &self.media {
                    let on = media.toggle_video();
                    self.emit(CallStatus::CamEnabled(on));
                }
            }
            CallCommand::HangUp => self.closing = true,
        }
    }

    async fn attach_local_tracks(&mut self, stream: &MediaStream) -> Result<(), SessionError> {
        for track in stream.tracks() {
            let newly_attached = self.session.attach_track(track).await?;
            if !newly_attached {
                debug!(track = %track.id(), "track already attached; skipping");
            }
        }
        Ok(())
    }

    /// Releases everything, in order: signaling channel, peer session, local
    /// capture. Each step is independent; one failing must not stop the
    /// others.
    async fn teardown(&mut self) {
        self.channel.close();

        if let Err(e) = self.session.close().await {
            warn!(error = %e, "failed to close peer session");
        }

        if let Some(media) = self.media.take() {
            media.stop();
        }

        self.state = NegotiationState::Closed;
        self.emit(CallStatus::Ended);
        info!("call engine stopped");
    }

    fn emit(&self, status: CallStatus) {
        let _ = self.status_tx.send(status);
    }
}
