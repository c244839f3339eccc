//! Error types for the HTTP layer
//!
//! - `app_error` - `AppError`, the error type returned by request handlers

pub mod app_error;

pub use app_error::{AppError, AppResult};
