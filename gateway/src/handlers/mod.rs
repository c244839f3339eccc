//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint
//! - `realtime` - Session defaults and SDP offer/answer relay

pub mod api;
pub mod realtime;

// Re-export commonly used handlers for convenient access
pub use realtime::{get_config, negotiate_sdp};
