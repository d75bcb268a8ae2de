use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use visio_core::IceServerConfig;
use visio_server::{AppState, RoomManager, SignalingService, ws_handler};

/// Signaling relay for 1:1 video calls.
#[derive(Parser)]
#[command(name = "visio-server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// STUN server URL advertised to clients.
    #[arg(long, default_value = "stun:stun.l.google.com:19302")]
    stun: String,

    /// Optional TURN server URL advertised to clients.
    #[arg(long)]
    turn: Option<String>,

    /// TURN username.
    #[arg(long)]
    turn_username: Option<String>,

    /// TURN credential.
    #[arg(long)]
    turn_credential: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut ice_servers = vec![IceServerConfig {
        urls: vec![args.stun],
        username: None,
        credential: None,
    }];
    if let Some(turn) = args.turn {
        ice_servers.push(IceServerConfig {
            urls: vec![turn],
            username: args.turn_username,
            credential: args.turn_credential,
        });
    }

    let signaling = SignalingService::new(ice_servers);
    let rooms = RoomManager::new(Arc::new(signaling.clone()));

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(AppState { signaling, rooms });

    info!("signaling relay listening on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
