use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use visio_core::{ClientId, RoomId};

/// One room, one task. Membership is an ordered list (join order), so the
/// existing-users snapshot a joiner receives lists peers oldest-first.
pub struct Room {
    name: RoomId,
    members: Vec<ClientId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        name: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            name,
            members: Vec::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.name, "room started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RoomCommand::Join { id } => self.handle_join(id).await,
                RoomCommand::Leave { id } => self.handle_leave(id).await,
            }
        }

        info!(room = %self.name, "room stopped");
    }

    async fn handle_join(&mut self, id: ClientId) {
        // a reconnecting id must not be listed among its own peers
        self.members.retain(|m| m != &id);

        let existing = self.members.clone();
        info!(room = %self.name, id = %id, present = existing.len(), "member joined");

        // The joiner alone learns who was already here; residents alone
        // learn of the arrival. Handling the join in one task, snapshot
        // before insert, is what makes the two role-discovery messages
        // mutually exclusive per pairing.
        self.signaling
            .send_existing_users(id.clone(), existing.clone())
            .await;
        for member in &existing {
            self.signaling
                .send_user_joined(member.clone(), id.clone())
                .await;
        }

        self.members.push(id);
    }

    async fn handle_leave(&mut self, id: ClientId) {
        let before = self.members.len();
        self.members.retain(|m| m != &id);
        if self.members.len() < before {
            info!(room = %self.name, id = %id, remaining = self.members.len(), "member left");
        }
    }
}
