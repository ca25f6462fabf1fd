//! # Churnguard
//!
//! Customer churn risk assessment over a pre-trained tree-ensemble pipeline.
//!
//! This crate provides:
//! - A validated five-field prediction request
//! - A `Predictor` port with a JSON tree-ensemble adapter
//! - Threshold-based risk classification
//! - Terminal UI for interactive scoring
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (PredictionRequest, Decision, RiskLevel)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (tree-ensemble pipeline)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Decision, PredictionRequest, RiskLevel};

/// Result type for Churnguard operations
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Main error type for Churnguard
#[derive(Debug, thiserror::Error)]
pub enum ChurnError {
    #[error("Invalid customer data: {0}")]
    Validation(String),

    #[error("Model not loaded: {0}")]
    ModelLoad(String),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ports::PredictError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
