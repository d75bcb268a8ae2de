use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use visio_core::RoomId;

/// Lazily spawns one task per room and hands out its command sender.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
}

impl RoomManager {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
        }
    }

    pub fn get_room_sender(&self, room: &RoomId) -> mpsc::Sender<RoomCommand> {
        if let Some(sender) = self.rooms.get(room) {
            return sender.clone();
        }

        info!(room = %room, "creating room");
        let (tx, rx) = mpsc::channel(100);

        let task = Room::new(room.clone(), rx, self.signaling.clone());
        tokio::spawn(task.run());

        self.rooms.insert(room.clone(), tx.clone());
        tx
    }
}
