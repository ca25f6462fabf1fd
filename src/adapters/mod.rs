//! Adapters layer: Concrete implementations of ports.
//!
//! - `pipeline`: JSON tree-ensemble artifact implementing `Predictor`

pub mod pipeline;
