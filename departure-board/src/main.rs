use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_board::board::{BoardConfig, LatestBoard};
use departure_board::config::MonitorConfig;
use departure_board::feed::{FeedClient, MockFeed};
use departure_board::scheduler::{Notification, RefreshScheduler, SchedulerHandle};
use departure_board::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MonitorConfig::from_env()?;
    let board_config = config.board_config();
    let latest = LatestBoard::new();

    // Start polling, from a mock file if one is configured
    let (scheduler, notifications) = match &config.mock_file {
        Some(path) => {
            warn!(path = %path.display(), "serving departures from mock file");
            RefreshScheduler::spawn(MockFeed::from_json_file(path)?, config.scheduler_config())
        }
        None => {
            let client = FeedClient::new(config.feed_config())?;
            info!(url = %client.endpoint(), "polling departure feed");
            RefreshScheduler::spawn(client, config.scheduler_config())
        }
    };

    tokio::spawn(consume(notifications, latest.clone(), board_config.clone()));
    tokio::spawn(redraw(latest.clone(), board_config.clone(), config.update_interval()));

    let title = format!("{}, {}", config.station, config.city);
    let state = AppState::new(latest, board_config, title, config.update_interval());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "departure board listening");
    println!();
    println!("Open http://{} in your browser for the board.", config.listen_addr);
    println!();
    println!("API Endpoints:");
    println!("  GET  /            - Departure board (HTML)");
    println!("  GET  /departures  - Departure board (JSON)");
    println!("  GET  /health      - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    stop(scheduler).await;
    Ok(())
}

/// Store each new snapshot and draw the board straight away on first load.
async fn consume(
    mut notifications: mpsc::Receiver<Notification>,
    latest: LatestBoard,
    config: BoardConfig,
) {
    while let Some(notification) = notifications.recv().await {
        match notification {
            Notification::Snapshot {
                snapshot,
                first_load,
            } => {
                if let Some(feed_error) = &snapshot.feed_error {
                    warn!(%feed_error, "feed reported an error");
                }
                latest.replace(snapshot).await;
                if first_load {
                    log_board(&latest, &config).await;
                }
            }
            Notification::Redraw { .. } => {
                error!("departure feed is refusing requests; check the station configuration");
                log_board(&latest, &config).await;
            }
        }
    }
}

/// Redraw the board on a fixed cadence, independent of fetches.
async fn redraw(latest: LatestBoard, config: BoardConfig, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        log_board(&latest, &config).await;
    }
}

async fn log_board(latest: &LatestBoard, config: &BoardConfig) {
    let now = Local::now().naive_local();
    match latest.rows(now, config).await {
        None => info!("no departures loaded yet"),
        Some(rows) if rows.is_empty() => info!("no upcoming departures"),
        Some(rows) => {
            for row in rows {
                info!(
                    line = %row.line,
                    destination = %row.destination,
                    departure = %row.departure,
                    "departure"
                );
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn stop(scheduler: SchedulerHandle) {
    if let Some(state) = scheduler.shutdown().await {
        info!(loaded = state.has_loaded_once(), "refresh scheduler stopped");
    }
}
