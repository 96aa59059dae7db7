//! Cellview - headless arena client that logs what it sees.

use std::time::{Duration, Instant};

use client::{Client, ClientConfig, Frame, Notice, Renderer};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Logs a one-line world summary at most once per interval.
struct LogRenderer {
    interval: Duration,
    last_report: Option<Instant>,
}

impl LogRenderer {
    fn new(interval: Duration) -> Self {
        Self { interval, last_report: None }
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        if self.last_report.is_some_and(|t| t.elapsed() < self.interval) {
            return;
        }
        self.last_report = Some(Instant::now());

        let fading = frame.cells.iter().filter(|c| c.fading).count();
        info!(
            "cells: {} ({} fading), owned: {}, score: {:.0}, view: ({:.0}, {:.0}) x{:.3}",
            frame.cells.len(),
            fading,
            frame.owned_count,
            frame.score,
            frame.camera.center.x,
            frame.camera.center.y,
            frame.camera.zoom,
        );
        // Cells are sorted by size, so the last owned one is the biggest.
        if let Some(cell) = frame.cells.iter().rev().find(|c| c.is_owned) {
            let owned_mass: f64 = frame.cells.iter().filter(|c| c.is_owned).map(|c| c.mass()).sum();
            debug!(
                "  owned mass: {:.0}, largest cell {} ({}) mass {:.0}",
                owned_mass,
                cell.id,
                cell.color.to_hex(),
                cell.mass(),
            );
        }
        for row in &frame.leaderboard {
            debug!("  {}. {}{}", row.rank, row.name, if row.is_self { " (you)" } else { "" });
        }
    }

    fn on_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Spawned => info!("Spawned"),
            Notice::Died => info!("Died"),
            Notice::Connected => info!("Handshake sent"),
            Notice::Disconnected => warn!("Disconnected"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Cellview v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = ClientConfig::load()?;
    if let Ok(url) = std::env::var("CONNECT_TO") {
        config.connection.url = url;
    }
    if let Ok(nick) = std::env::var("NICK") {
        config.player.nickname = Some(nick);
    }
    info!("Loaded configuration");
    info!("  Server: {}", config.connection.url);
    info!("  Viewport: {}x{}", config.view.width, config.view.height);
    if let Some(nick) = &config.player.nickname {
        info!("  Nickname: {}", nick);
    }

    let (handle, commands) = client::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            let _ = handle.shutdown();
        }
    });

    let mut client = Client::new(config, LogRenderer::new(Duration::from_secs(1)));
    client.run(commands).await?;

    Ok(())
}
