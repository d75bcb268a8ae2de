//! End-to-end negotiation: two engines talking through a real room actor,
//! with an in-memory relay standing in for the WebSocket layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use visio_client::session::SessionEvent;
use visio_client::{CallCommand, CallStatus};
use visio_core::{ClientId, ClientMessage, RoomId, SdpKind, ServerMessage};
use visio_server::{Room, RoomCommand, SignalingOutput};

use crate::utils::{
    MockPeerSession, SessionOp, candidate, init_tracing, local_media, spawn_engine,
    wait_for_status,
};

/// Routes relay-to-client traffic by client id, like the connection registry
/// does in the real server.
#[derive(Clone, Default)]
struct TestRelay {
    peers: Arc<Mutex<HashMap<ClientId, mpsc::Sender<ServerMessage>>>>,
}

impl TestRelay {
    async fn register(&self, id: ClientId, tx: mpsc::Sender<ServerMessage>) {
        self.peers.lock().await.insert(id, tx);
    }

    async fn deliver(&self, to: &ClientId, msg: ServerMessage) {
        let tx = self.peers.lock().await.get(to).cloned();
        if let Some(tx) = tx {
            let _ = tx.send(msg).await;
        }
    }
}

#[async_trait]
impl SignalingOutput for TestRelay {
    async fn send_existing_users(&self, to: ClientId, users: Vec<ClientId>) {
        self.deliver(&to, ServerMessage::ExistingUsers { users }).await;
    }

    async fn send_user_joined(&self, to: ClientId, id: ClientId) {
        self.deliver(&to, ServerMessage::UserJoined { id }).await;
    }
}

/// Forwards one client's outbound messages the way the WebSocket handler
/// does: joins become room commands, everything else is relayed to its
/// target. A closed outbound stream becomes a leave.
fn pump_outbound(
    my_id: ClientId,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    relay: TestRelay,
    room_tx: mpsc::Sender<RoomCommand>,
) {
    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            match msg {
                ClientMessage::JoinRoom { .. } => {
                    let _ = room_tx.send(RoomCommand::Join { id: my_id.clone() }).await;
                }
                ClientMessage::Offer {
                    description,
                    target,
                } => {
                    relay
                        .deliver(
                            &target,
                            ServerMessage::Offer {
                                description,
                                from: my_id.clone(),
                            },
                        )
                        .await;
                }
                ClientMessage::Answer {
                    description,
                    target,
                } => {
                    relay
                        .deliver(&target, ServerMessage::Answer { description })
                        .await;
                }
                ClientMessage::IceCandidate { candidate, target } => {
                    relay
                        .deliver(&target, ServerMessage::IceCandidate { candidate })
                        .await;
                }
            }
        }
        let _ = room_tx.send(RoomCommand::Leave { id: my_id }).await;
    });
}

#[tokio::test]
async fn two_engines_negotiate_and_tear_down() {
    init_tracing();
    let relay = TestRelay::default();
    let (room_tx, room_rx) = mpsc::channel(100);
    tokio::spawn(Room::new(RoomId::from("ward-7"), room_rx, Arc::new(relay.clone())).run());

    let a_id = ClientId::new();
    let b_id = ClientId::new();

    // first participant: ends up the caller once b arrives
    let mut a = spawn_engine("ward-7", |tx| {
        MockPeerSession::new()
            .with_events(tx)
            .trickling(vec![candidate("cand-a")])
            .with_remote_media()
    });
    relay.register(a_id.clone(), a.server_tx.clone()).await;
    pump_outbound(a_id.clone(), a.outbound_rx, relay.clone(), room_tx.clone());
    let (stream_a, ..) = local_media();
    a.media_tx.send(Ok(stream_a)).await.unwrap();
    wait_for_status(&mut a.status_rx, |s| *s == CallStatus::Alone).await;

    // second participant: callee
    let mut b = spawn_engine("ward-7", |tx| {
        MockPeerSession::new()
            .with_events(tx)
            .trickling(vec![candidate("cand-b")])
            .with_remote_media()
    });
    relay.register(b_id.clone(), b.server_tx.clone()).await;
    pump_outbound(b_id.clone(), b.outbound_rx, relay.clone(), room_tx.clone());
    let (stream_b, b_audio, b_video) = local_media();
    b.media_tx.send(Ok(stream_b)).await.unwrap();

    wait_for_status(&mut a.status_rx, |s| *s == CallStatus::Calling(b_id.clone())).await;
    wait_for_status(&mut b.status_rx, |s| {
        *s == CallStatus::IncomingCall(a_id.clone())
    })
    .await;
    wait_for_status(&mut a.status_rx, |s| *s == CallStatus::Connected).await;
    wait_for_status(&mut b.status_rx, |s| *s == CallStatus::Connected).await;

    // the callee applied the offer before answering
    let b_ops = b.session.ops();
    let remote = b_ops
        .iter()
        .position(|op| *op == SessionOp::SetRemote(SdpKind::Offer))
        .unwrap();
    let answer = b_ops
        .iter()
        .position(|op| *op == SessionOp::CreateAnswer)
        .unwrap();
    assert!(remote < answer);

    // trickled candidates crossed the relay in both directions
    assert!(a.session.applied_candidates().contains(&"cand-b".to_owned()));
    assert!(b.session.applied_candidates().contains(&"cand-a".to_owned()));

    // a hangs up; b's transport notices and closes its own side
    a.command_tx.send(CallCommand::HangUp).await.unwrap();
    a.handle.await.unwrap();
    wait_for_status(&mut a.status_rx, |s| *s == CallStatus::Ended).await;
    assert_eq!(a.session.ops().last(), Some(&SessionOp::Close));

    b.session_tx.send(SessionEvent::Closed).await.unwrap();
    b.handle.await.unwrap();
    wait_for_status(&mut b.status_rx, |s| *s == CallStatus::Ended).await;
    assert_eq!(b.session.ops().last(), Some(&SessionOp::Close));
    assert!(b_audio.is_stopped());
    assert!(b_video.is_stopped());
}
