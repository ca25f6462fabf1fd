//! Predictor port: Trait for the trained classification pipeline.
//!
//! The application only relies on `predict_proba`; how the artifact is
//! represented on disk is the adapter's business.

use std::collections::BTreeMap;

use crate::domain::PredictionRequest;

/// Column names the pipeline was trained with.
pub const COLUMN_TENURE: &str = "tenure";
pub const COLUMN_MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const COLUMN_TOTAL_CHARGES: &str = "TotalCharges";
pub const COLUMN_CONTRACT: &str = "Contract";
pub const COLUMN_PAYMENT_METHOD: &str = "PaymentMethod";

/// A single cell of a boundary row.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl FeatureValue {
    /// Numeric view of the value; strings have none.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One row of named columns, the format handed to a [`Predictor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    columns: BTreeMap<String, FeatureValue>,
}

impl FeatureRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any previous value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<&PredictionRequest> for FeatureRow {
    fn from(req: &PredictionRequest) -> Self {
        Self::new()
            .with(COLUMN_TENURE, FeatureValue::Int(req.tenure()))
            .with(COLUMN_MONTHLY_CHARGES, FeatureValue::Float(req.monthly_charges()))
            .with(COLUMN_TOTAL_CHARGES, FeatureValue::Float(req.total_charges()))
            .with(
                COLUMN_CONTRACT,
                FeatureValue::Str(req.contract().label().to_string()),
            )
            .with(
                COLUMN_PAYMENT_METHOD,
                FeatureValue::Str(req.payment_method().label().to_string()),
            )
    }
}

/// Errors raised while scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// Rows do not match the columns the pipeline expects
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The pipeline produced something that is not a probability pair per row
    #[error("Invalid predictor output: {0}")]
    InvalidOutput(String),

    #[error("Predictor failure: {0}")]
    Internal(String),
}

/// Trait for a trained binary classifier.
///
/// Implementations must be deterministic: identical rows yield identical
/// probabilities.
pub trait Predictor {
    /// Display name of the model family, e.g. "LightGBM".
    fn model_family(&self) -> &str;

    /// Score rows, returning `[p(no churn), p(churn)]` per row, in order.
    ///
    /// # Errors
    /// Returns `PredictError::SchemaMismatch` if a row lacks a column, holds a
    /// value of the wrong type, or names an unknown category.
    fn predict_proba(&self, rows: &[FeatureRow]) -> Result<Vec<[f64; 2]>, PredictError>;
}
