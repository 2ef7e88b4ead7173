//! Axum middleware.

pub mod tracking;

pub use tracking::{visitor_tracking_middleware, TrackingState};
