//! HTTP API routes
//!
//! Exposes the session's operations: four setters and one analysis query.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::features::FeatureSource;
use crate::forecast::{Persona, Thresholds};
use crate::geo::GeoBackend;
use crate::server::state::AppState;
use crate::session::{AnalysisReport, SessionState};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router<G, F>(state: Arc<AppState<G, F>>) -> Router
where
    G: GeoBackend + 'static,
    F: FeatureSource + 'static,
{
    Router::new()
        .route("/api/status", get(status_handler::<G, F>))
        .route("/api/personas", get(personas_handler))
        .route("/api/session", get(session_handler::<G, F>))
        .route("/api/session/address", post(address_handler::<G, F>))
        .route("/api/session/location", post(location_handler::<G, F>))
        .route("/api/session/persona", put(persona_handler::<G, F>))
        .route("/api/session/radius", put(radius_handler::<G, F>))
        .route("/api/session/analysis", get(analysis_handler::<G, F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "ADDRESS_NOT_FOUND" => StatusCode::NOT_FOUND,
            "NO_LOCATION" => StatusCode::CONFLICT,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::AddressNotFound(_) => "ADDRESS_NOT_FOUND",
            Error::NoLocation => "NO_LOCATION",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidRadius(_) => "INVALID_RADIUS",
            Error::UnknownPersona(_) => "UNKNOWN_PERSONA",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            error: rejection.body_text(),
            code: "INVALID_REQUEST".to_string(),
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Current session settings
    pub session: SessionState,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<G, F>(State(state): State<Arc<AppState<G, F>>>) -> Json<StatusResponse>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let session = *state.session.lock().await.state();
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        session,
        uptime_secs: state.uptime_secs(),
    })
}

/// Persona list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonasResponse {
    pub personas: Vec<PersonaInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonaInfo {
    pub name: String,
    pub label: String,
    pub thresholds: Thresholds,
}

/// List personas and their verdict thresholds
///
/// GET /api/personas
async fn personas_handler() -> Json<PersonasResponse> {
    let personas = Persona::ALL
        .iter()
        .map(|p| PersonaInfo {
            name: p.to_string(),
            label: p.label().to_string(),
            thresholds: p.thresholds(),
        })
        .collect();

    Json(PersonasResponse { personas })
}

/// Current session state
///
/// GET /api/session
async fn session_handler<G, F>(State(state): State<Arc<AppState<G, F>>>) -> Json<SessionState>
where
    G: GeoBackend,
    F: FeatureSource,
{
    Json(*state.session.lock().await.state())
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: String,
}

/// Geocode an address, select it and analyze it
///
/// POST /api/session/address
async fn address_handler<G, F>(
    State(state): State<Arc<AppState<G, F>>>,
    body: Result<Json<AddressRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let Json(req) = body?;
    let mut session = state.session.lock().await;
    let report = session.set_address(&req.address).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lng: f64,
}

/// Select a site picked on the map and analyze it
///
/// POST /api/session/location
async fn location_handler<G, F>(
    State(state): State<Arc<AppState<G, F>>>,
    body: Result<Json<LocationRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let Json(req) = body?;
    let mut session = state.session.lock().await;
    let report = session.set_coordinate(Coordinates::new(req.lat, req.lng)).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct PersonaRequest {
    pub persona: String,
}

/// Switch persona; does not re-analyze
///
/// PUT /api/session/persona
async fn persona_handler<G, F>(
    State(state): State<Arc<AppState<G, F>>>,
    body: Result<Json<PersonaRequest>, JsonRejection>,
) -> Result<Json<SessionState>, ApiError>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let Json(req) = body?;
    let persona =
        Persona::from_str(&req.persona).map_err(|_| Error::UnknownPersona(req.persona.clone()))?;
    let mut session = state.session.lock().await;
    Ok(Json(*session.set_persona(persona)))
}

#[derive(Debug, Deserialize)]
pub struct RadiusRequest {
    pub radius: u32,
}

/// Change the scan radius; does not re-analyze
///
/// PUT /api/session/radius
async fn radius_handler<G, F>(
    State(state): State<Arc<AppState<G, F>>>,
    body: Result<Json<RadiusRequest>, JsonRejection>,
) -> Result<Json<SessionState>, ApiError>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let Json(req) = body?;
    let mut session = state.session.lock().await;
    let updated = *session.set_radius(req.radius)?;
    Ok(Json(updated))
}

/// Fresh analysis of the selected site
///
/// GET /api/session/analysis
async fn analysis_handler<G, F>(
    State(state): State<Arc<AppState<G, F>>>,
) -> Result<Json<AnalysisReport>, ApiError>
where
    G: GeoBackend,
    F: FeatureSource,
{
    let session = state.session.lock().await;
    let report = session.analysis().await?;
    Ok(Json(report))
}
