//! Domain layer: Core business types and logic.
//!
//! Pure types with validation; nothing here touches the model artifact or the terminal.

mod decision;
mod request;

pub use decision::{format_percentage, Decision, RiskLevel, RISK_THRESHOLD};
pub use request::{
    Contract, PaymentMethod, PredictionRequest, RawInputs, DEFAULT_MONTHLY_CHARGES,
    DEFAULT_TENURE, DEFAULT_TOTAL_CHARGES, TENURE_MAX, TENURE_MIN,
};
