//! Prediction result types.
//!
//! Represents the output of the readmission classifier.

use serde::{Deserialize, Serialize};

/// Coarse readmission risk band derived from the probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// Readmission unlikely
    Low,
    /// Follow-up call recommended
    Moderate,
    /// Discharge planning review advised
    High,
}

impl RiskBand {
    /// Band for a probability: Low < 0.3 <= Moderate < 0.7 <= High.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Low
        } else if probability < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Probability that the patient is readmitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadmissionPrediction {
    /// Positive-class probability (0.0 to 1.0)
    pub readmission_probability: f64,

    /// Risk band for display
    pub risk_band: RiskBand,
}

impl ReadmissionPrediction {
    #[must_use]
    pub fn new(probability: f64) -> Self {
        Self {
            readmission_probability: probability,
            risk_band: RiskBand::from_probability(probability),
        }
    }
}
