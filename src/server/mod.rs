//! HTTP server for franchise-scout
//!
//! Hosts one analysis session behind a JSON API.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::features::overpass::OverpassBackend;
use crate::geo::nominatim::NominatimBackend;
use crate::model::ForecastModels;
use crate::session::Session;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// Builds the session from `config` and the already trained `models`.
/// Never returns unless the server shuts down.
pub async fn run(config: Config, models: Arc<ForecastModels>) -> Result<()> {
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let services = &config.services;
    let session = Session::new(
        NominatimBackend::new(&services.nominatim_url, &services.user_agent)?,
        OverpassBackend::new(&services.overpass_url, &services.user_agent)?,
        models,
        config.defaults.persona,
        config.defaults.radius,
    )?;

    let state = Arc::new(AppState::new(session));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
