use visio_client::session::SessionEvent;
use visio_client::{CallCommand, CallStatus};
use visio_core::ServerMessage;

use crate::utils::{
    MockPeerSession, SessionOp, assert_no_outbound, init_tracing, local_media, recv_outbound,
    settle, spawn_engine, wait_for_status,
};

#[tokio::test]
async fn hang_up_releases_channel_session_and_media() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    let (stream, audio, video) = local_media();
    call.media_tx.send(Ok(stream)).await.unwrap();
    settle().await;

    call.command_tx.send(CallCommand::HangUp).await.unwrap();
    call.handle.await.unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Ended).await;
    assert_eq!(call.session.ops().last(), Some(&SessionOp::Close));
    assert!(audio.is_stopped());
    assert!(video.is_stopped());
    // the engine dropped its end of the signaling transport
    assert!(call.outbound_rx.recv().await.is_none());
}

#[tokio::test]
async fn toggles_flip_locally_and_stay_off_the_wire() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    let (stream, audio, video) = local_media();
    call.media_tx.send(Ok(stream)).await.unwrap();
    settle().await;

    call.command_tx.send(CallCommand::ToggleMic).await.unwrap();
    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::MicEnabled(false)).await;
    assert!(!audio.is_enabled());
    assert!(video.is_enabled());

    call.command_tx.send(CallCommand::ToggleMic).await.unwrap();
    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::MicEnabled(true)).await;
    assert!(audio.is_enabled());

    call.command_tx.send(CallCommand::ToggleCam).await.unwrap();
    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::CamEnabled(false)).await;
    assert!(!video.is_enabled());

    // muting is purely local
    assert_no_outbound(&mut call.outbound_rx).await;
    assert!(call.session.ops().is_empty());
}

#[tokio::test]
async fn failing_session_close_still_stops_capture() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new().failing_close());
    recv_outbound(&mut call.outbound_rx).await;

    let (stream, audio, video) = local_media();
    call.media_tx.send(Ok(stream)).await.unwrap();
    settle().await;

    call.command_tx.send(CallCommand::HangUp).await.unwrap();
    call.handle.await.unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Ended).await;
    assert!(audio.is_stopped());
    assert!(video.is_stopped());
}

#[tokio::test]
async fn session_close_event_ends_the_call() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    call.session_tx.send(SessionEvent::Closed).await.unwrap();
    call.handle.await.unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Ended).await;
    assert!(call.session.ops().contains(&SessionOp::Close));
}

#[tokio::test]
async fn remote_media_reports_connected() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    call.session_tx
        .send(SessionEvent::RemoteMedia)
        .await
        .unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Connected).await;
}

#[tokio::test]
async fn lost_transport_reports_channel_lost() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    drop(call.server_tx);
    call.handle.await.unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::ChannelLost).await;
    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Ended).await;
}

#[tokio::test]
async fn registration_is_surfaced() {
    init_tracing();
    let mut call = spawn_engine("r", |_| MockPeerSession::new());
    recv_outbound(&mut call.outbound_rx).await;

    let id = visio_core::ClientId::new();
    call.server_tx
        .send(ServerMessage::Welcome { id: id.clone() })
        .await
        .unwrap();

    wait_for_status(&mut call.status_rx, |s| *s == CallStatus::Registered(id.clone())).await;
}
