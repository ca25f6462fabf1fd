//! Assessment service: Scores one form submission.
//!
//! This service coordinates:
//! - Request validation
//! - Conversion to the predictor's row format
//! - The single `predict_proba` call
//! - Risk classification

use crate::domain::{Decision, PredictionRequest, RawInputs, RISK_THRESHOLD};
use crate::ports::{FeatureRow, PredictError, Predictor};
use crate::ChurnError;

/// Where the form is between submissions.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentState {
    /// Awaiting a submission; carries the error of the last failed one, if any
    Idle { error: Option<String> },
    /// Last submission succeeded
    ResultShown(Decision),
}

impl Default for AssessmentState {
    fn default() -> Self {
        Self::Idle { error: None }
    }
}

/// Service owning the loaded predictor for the life of the process.
pub struct AssessmentService<P: Predictor> {
    predictor: P,
}

impl<P: Predictor> AssessmentService<P> {
    /// Create a new assessment service around an already-loaded predictor.
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    #[must_use]
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    #[must_use]
    pub fn model_family(&self) -> &str {
        self.predictor.model_family()
    }

    /// Footer caption naming the model and the threshold.
    #[must_use]
    pub fn caption(&self) -> String {
        format!(
            "Model: {} | Threshold: {RISK_THRESHOLD:.2} | Purpose: Customer Retention Targeting",
            self.model_family()
        )
    }

    /// Validate, score and classify one submission.
    ///
    /// # Errors
    /// Returns `ChurnError::Validation` for out-of-domain inputs and
    /// `ChurnError::Prediction` if the predictor fails or returns something
    /// other than one probability pair in [0, 1].
    pub fn handle_submit(&self, raw: RawInputs) -> Result<Decision, ChurnError> {
        let request = PredictionRequest::try_from(raw)?;
        let row = FeatureRow::from(&request);

        let output = self.predictor.predict_proba(std::slice::from_ref(&row))?;
        let [_, probability] = match output.as_slice() {
            [pair] => *pair,
            other => {
                return Err(PredictError::InvalidOutput(format!(
                    "expected 1 row of probabilities, got {}",
                    other.len()
                ))
                .into())
            }
        };

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::InvalidOutput(format!(
                "churn probability {probability} outside [0, 1]"
            ))
            .into());
        }

        let decision = Decision::new(probability);
        tracing::info!(
            "Prediction complete: probability={}, risk={}",
            decision.percentage(),
            decision.risk_level
        );
        Ok(decision)
    }

    /// Apply a submission to the form state.
    ///
    /// Success always lands in `ResultShown`; failure returns to `Idle` with
    /// the message the user should see.
    #[must_use]
    pub fn submit(&self, raw: RawInputs) -> AssessmentState {
        match self.handle_submit(raw) {
            Ok(decision) => AssessmentState::ResultShown(decision),
            Err(e) => {
                tracing::warn!("Submission failed: {}", e);
                AssessmentState::Idle {
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
