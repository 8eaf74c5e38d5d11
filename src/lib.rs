//! franchise-scout: Site Intelligence for Franchise Placement
//!
//! Scores a candidate location for a franchise persona by counting nearby
//! points-of-interest in OpenStreetMap and feeding the counts to a revenue
//! model.
//!
//! ## Pipeline
//!
//! - Train one random forest per persona on synthetic rows (once per process)
//! - Geocode an address with Nominatim, or take coordinates directly
//! - Count competitors, demand drivers and leisure amenities with Overpass
//! - Predict monthly revenue and band it into Prime / Viable / Avoid
//!
//! ## Quick Start
//!
//! ```rust
//! use franchise_scout::features::FeatureCounts;
//! use franchise_scout::forecast::{analyze, Persona, Verdict};
//! use franchise_scout::model::ForecastModels;
//!
//! let models = ForecastModels::train_default();
//!
//! // No demand drivers: the model is bypassed
//! let counts = FeatureCounts::new(5, 0, 3);
//! let result = analyze(&models, &counts, Persona::Premium);
//! assert_eq!(result.predicted_revenue, 0.0);
//! assert_eq!(result.verdict, Verdict::Avoid);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod features;
pub mod forecast;
pub mod format;
pub mod geo;
pub mod model;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use features::FeatureCounts;
pub use forecast::{ForecastResult, Persona, Verdict};
pub use model::ForecastModels;
pub use session::{AnalysisReport, Session, SessionState};
