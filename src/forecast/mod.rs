//! Revenue forecast and verdict
//!
//! Turns feature counts into a predicted monthly revenue using the persona's
//! model, then bands it into a verdict with the persona's thresholds.

mod persona;

pub use persona::{Persona, Thresholds};

use crate::features::FeatureCounts;
use crate::model::ForecastModels;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative site verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Revenue above the high threshold
    Prime,
    /// Revenue above the low threshold, at most the high one
    Viable,
    /// Revenue at or below the low threshold
    Avoid,
}

impl Verdict {
    /// Band a revenue figure; both boundaries are exclusive on the low side
    pub fn classify(revenue: f64, thresholds: Thresholds) -> Self {
        if revenue > thresholds.high {
            Self::Prime
        } else if revenue > thresholds.low {
            Self::Viable
        } else {
            Self::Avoid
        }
    }

    /// One-line explanation; a Prime site cites its driver count
    pub fn summary(&self, drivers: u32) -> String {
        match self {
            Self::Prime => format!(
                "High traffic ({}) matches your business model perfectly",
                drivers
            ),
            Self::Viable => "Viable but requires marketing".to_string(),
            Self::Avoid => "Site metrics too weak".to_string(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prime => write!(f, "PRIME"),
            Self::Viable => write!(f, "VIABLE"),
            Self::Avoid => write!(f, "AVOID"),
        }
    }
}

/// Forecast for one site and one persona
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Estimated monthly revenue (the model may emit negatives)
    pub predicted_revenue: f64,
    pub verdict: Verdict,
    /// True when the zero-driver override replaced the model output
    pub guardrail_applied: bool,
}

/// Forecast a site for a persona
///
/// With no demand drivers at all the model is bypassed and revenue is 0: the
/// models never saw fewer than 5 drivers during training.
pub fn analyze(
    models: &ForecastModels,
    counts: &FeatureCounts,
    persona: Persona,
) -> ForecastResult {
    let thresholds = persona.thresholds();

    if counts.drivers == 0 {
        return ForecastResult {
            predicted_revenue: 0.0,
            verdict: Verdict::classify(0.0, thresholds),
            guardrail_applied: true,
        };
    }

    let predicted_revenue = models.predict(persona, counts);
    ForecastResult {
        predicted_revenue,
        verdict: Verdict::classify(predicted_revenue, thresholds),
        guardrail_applied: false,
    }
}
