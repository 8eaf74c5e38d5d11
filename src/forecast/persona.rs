//! Business personas

use crate::features::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict thresholds in monthly revenue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: f64,
    pub low: f64,
}

/// Business archetype with its own model and thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Premium cafe: likes leisure and traffic, tolerates competition
    #[default]
    Premium,
    /// Budget tea stall: likes traffic, hurt by competition
    Budget,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::Premium, Persona::Budget];

    pub fn thresholds(&self) -> Thresholds {
        match self {
            Self::Premium => Thresholds {
                high: 8000.0,
                low: 5000.0,
            },
            Self::Budget => Thresholds {
                high: 4000.0,
                low: 2500.0,
            },
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Premium => "Premium Cafe",
            Self::Budget => "Budget Tea Stall",
        }
    }

    /// How a category reads for this persona
    pub fn impact(&self, category: Category) -> &'static str {
        match (self, category) {
            (Self::Budget, Category::Competitors) => "-Bad",
            (Self::Premium, Category::Competitors) => "Neutral",
            (_, Category::Drivers) => "+Good",
            (_, Category::Leisure) => "+Premium",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Premium => write!(f, "premium"),
            Self::Budget => write!(f, "budget"),
        }
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "premium" | "premium_cafe" | "premium-cafe" | "cafe" => Ok(Self::Premium),
            "budget" | "budget_tea_stall" | "budget-tea-stall" | "tea_stall" | "tea-stall" => {
                Ok(Self::Budget)
            }
            _ => Err(format!("Unknown persona: {}", s)),
        }
    }
}
