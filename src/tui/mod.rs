//! TUI module: Terminal User Interface using Ratatui.
//!
//! One screen holding:
//! - Title and description
//! - Customer information form
//! - Prediction result area
//! - Model caption

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::RetentionTheme;
