//! Rookery server binary.
//!
//! Binds the TCP listener and wires the coordinator to in-memory stores.
//! Account registration and the lobby live elsewhere; to make a standalone
//! process playable, one demo game is seeded and its tokens are logged.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rookery_core::Color;
use rookery_server::{Coordinator, MemoryGameStore, MemoryIdentityStore, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("rookery_server=info".parse()?))
        .init();

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("ROOKERY_LISTEN_ADDR") {
        config.listen_addr = addr.parse()?;
    }
    config.validate()?;

    let identities = Arc::new(MemoryIdentityStore::new());
    let games = Arc::new(MemoryGameStore::new());

    // Seed a playable game so the standalone binary is usable without a lobby.
    let mut demo = games.create("demo");
    demo.white = Some("white-player".into());
    demo.black = Some("black-player".into());
    games.insert(demo.clone());
    let white_token = identities.issue("white-player");
    let black_token = identities.issue("black-player");
    let observer_token = identities.issue("observer");
    tracing::info!(game_id = %demo.id, "seeded demo game");
    tracing::info!(%white_token, color = %Color::White, "demo seat token");
    tracing::info!(%black_token, color = %Color::Black, "demo seat token");
    tracing::info!(%observer_token, "demo observer token");

    let coordinator = Arc::new(Coordinator::new(identities, games));
    rookery_server::server::run(config, coordinator).await?;
    Ok(())
}
