//! Server shared state
//!
//! The server hosts exactly one analysis session; requests take turns on it.

use crate::features::FeatureSource;
use crate::geo::GeoBackend;
use crate::session::Session;
use std::time::Instant;
use tokio::sync::Mutex;

/// Shared state for the HTTP server
pub struct AppState<G, F> {
    /// The single interactive session
    pub session: Mutex<Session<G, F>>,

    started: Instant,
}

impl<G: GeoBackend, F: FeatureSource> AppState<G, F> {
    /// Create new application state around a session
    pub fn new(session: Session<G, F>) -> Self {
        Self {
            session: Mutex::new(session),
            started: Instant::now(),
        }
    }

    /// Seconds since the server state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
