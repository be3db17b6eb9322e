mod ai;
mod camera;
mod clock;
mod config;
mod drive;
mod input;
mod net;
mod sim;
mod spawn;
mod state;
mod track;
mod vehicle;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::clock::MonotonicClock;
use crate::config::ServerConfig;
use crate::net::start_websocket_server;
use crate::sim::{Simulation, VisualSink};
use crate::state::SharedGameState;
use crate::vehicle::ARCADE;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚀 Starting circuit server...");

    let config = ServerConfig::from_env()?;

    // No track, no session.
    let track = Arc::new(track::generate(&config.track).context("track generation failed")?);
    info!(
        points = track.len(),
        radius = config.track.base_radius,
        a1 = config.track.amplitudes[0],
        a2 = config.track.amplitudes[1],
        seed = ?config.track_seed,
        "🏁 track generated"
    );

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let mut sim = Simulation::new(Arc::clone(&track), config.ai_cars, config.track.base_radius, &ARCADE);
    let start = sim.vehicle().position;
    info!(ai_cars = sim.ai_cars().len(), x = start.x, z = start.z, "🚗 session ready");

    // Start WebSocket server
    let server = tokio::spawn(start_websocket_server(config.bind, Arc::clone(&state), Arc::clone(sim.track())));

    // Frame driver: one tick per callback, dt measured, not assumed
    let mut ticker = interval(Duration::from_secs_f64(1.0 / config.tick_hz as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = MonotonicClock::new();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut game = state.lock().await;
                let snapshot = sim.tick(&game.keys, &mut clock);
                game.publish(&snapshot);
            }
            res = &mut shutdown => {
                res.context("listening for shutdown signal")?;
                info!("🛑 shutting down");
                break;
            }
        }

        if server.is_finished() {
            break;
        }
    }

    if server.is_finished() {
        match server.await {
            Ok(Err(err)) => return Err(err.context("websocket server stopped")),
            Err(err) => error!(%err, "websocket task panicked"),
            Ok(Ok(())) => {}
        }
    } else {
        server.abort();
    }

    Ok(())
}
