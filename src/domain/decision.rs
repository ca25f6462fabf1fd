//! Risk classification of a churn probability.

use serde::{Deserialize, Serialize};

/// Probabilities at or above this value are classified as high risk.
pub const RISK_THRESHOLD: f64 = 0.35;

/// Risk level classification for churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Customer is unlikely to churn
    Low,
    /// Customer should be targeted for retention
    High,
}

impl RiskLevel {
    /// Classify a probability against [`RISK_THRESHOLD`] (closed lower bound).
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= RISK_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Banner text shown to the user.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Churn Risk",
            Self::High => "High Churn Risk — Retention Action Recommended",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Render a probability the way the result metric shows it, e.g. `37.21%`.
#[must_use]
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Outcome of one successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Churn probability (0.0 to 1.0)
    pub probability: f64,

    /// Risk classification
    pub risk_level: RiskLevel,
}

impl Decision {
    #[must_use]
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            risk_level: RiskLevel::from_probability(probability),
        }
    }

    /// The metric string, e.g. `37.21%`.
    #[must_use]
    pub fn percentage(&self) -> String {
        format_percentage(self.probability)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.risk_level.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(RiskLevel::from_probability(0.35), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.3499), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Decision::new(0.9).label(), "High Churn Risk — Retention Action Recommended");
        assert_eq!(Decision::new(0.1).label(), "Low Churn Risk");
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(format_percentage(0.35), "35.00%");
        assert_eq!(format_percentage(0.0), "0.00%");
        assert_eq!(format_percentage(1.0), "100.00%");
        assert_eq!(format_percentage(0.123456), "12.35%");
        assert_eq!(Decision::new(0.5).percentage(), "50.00%");
    }
}
