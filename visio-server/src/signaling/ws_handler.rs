use crate::AppState;
use crate::room::RoomCommand;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};
use visio_core::{ClientId, ClientMessage, SdpKind, ServerMessage};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = ClientId::new();
    info!(id = %client_id, "new signaling connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(client_id.clone(), tx);
    state.signaling.send_signal(
        &client_id,
        ServerMessage::Welcome {
            id: client_id.clone(),
        },
    );
    state.signaling.send_signal(
        &client_id,
        ServerMessage::IceConfig {
            ice_servers: state.signaling.ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // shared with the recv task so the leave below fires even when the
    // send side is what dies first
    let joined_room: Arc<Mutex<Option<mpsc::Sender<RoomCommand>>>> = Arc::new(Mutex::new(None));

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let client_id = client_id.clone();
        let joined_room = joined_room.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(signal) => {
                            handle_signal(&state, &client_id, &joined_room, signal).await;
                        }
                        Err(e) => warn!(id = %client_id, error = %e, "invalid client message"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // the transport-level close is the only leave signal there is
    let room = joined_room.lock().await.take();
    if let Some(room) = room {
        let _ = room
            .send(RoomCommand::Leave {
                id: client_id.clone(),
            })
            .await;
    }

    state.signaling.remove_peer(&client_id);
    info!(id = %client_id, "signaling connection closed");
}

/// Relays one client message: joins go to the room actor, negotiation
/// payloads are validated and forwarded to their target.
pub async fn handle_signal(
    state: &AppState,
    from: &ClientId,
    joined_room: &Mutex<Option<mpsc::Sender<RoomCommand>>>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::JoinRoom { room } => {
            info!(id = %from, room = %room, "join request");
            let room_tx = state.rooms.get_room_sender(&room);
            if room_tx
                .send(RoomCommand::Join { id: from.clone() })
                .await
                .is_err()
            {
                error!(room = %room, "room task is gone");
            }
            *joined_room.lock().await = Some(room_tx);
        }
        ClientMessage::Offer {
            description,
            target,
        } => {
            if description.kind != SdpKind::Offer {
                warn!(from = %from, "offer message with a non-offer payload; dropping");
                return;
            }
            state.signaling.send_signal(
                &target,
                ServerMessage::Offer {
                    description,
                    from: from.clone(),
                },
            );
        }
        ClientMessage::Answer {
            description,
            target,
        } => {
            if description.kind != SdpKind::Answer {
                warn!(from = %from, "answer message with a non-answer payload; dropping");
                return;
            }
            state
                .signaling
                .send_signal(&target, ServerMessage::Answer { description });
        }
        ClientMessage::IceCandidate { candidate, target } => {
            state
                .signaling
                .send_signal(&target, ServerMessage::IceCandidate { candidate });
        }
    }
}
