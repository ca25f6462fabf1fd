//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the application and the trained model artifact.

mod predictor;

pub use predictor::{
    FeatureRow, FeatureValue, PredictError, Predictor, COLUMN_CONTRACT, COLUMN_MONTHLY_CHARGES,
    COLUMN_PAYMENT_METHOD, COLUMN_TENURE, COLUMN_TOTAL_CHARGES,
};
