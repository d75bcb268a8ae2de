
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use visio_core::RoomId;
use visio_server::{Room, RoomCommand};

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_room() -> (mpsc::Sender<RoomCommand>, MockSignalingOutput) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RoomCommand>(100);
    let signaling = MockSignalingOutput::new();

    let room = Room::new(
        RoomId::from("test-room"),
        cmd_rx,
        Arc::new(signaling.clone()),
    );

    tokio::spawn(room.run());

    (cmd_tx, signaling)
}
