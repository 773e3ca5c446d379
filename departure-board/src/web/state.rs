//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use crate::board::{BoardConfig, LatestBoard};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Latest snapshot from the refresh scheduler
    pub board: LatestBoard,

    /// Board layout
    pub config: Arc<BoardConfig>,

    /// Page heading, e.g. "Hauptbahnhof, Düsseldorf"
    pub title: Arc<str>,

    /// How often the HTML page reloads itself
    pub refresh: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        board: LatestBoard,
        config: BoardConfig,
        title: impl Into<Arc<str>>,
        refresh: Duration,
    ) -> Self {
        Self {
            board,
            config: Arc::new(config),
            title: title.into(),
            refresh,
        }
    }
}
