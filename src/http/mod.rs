//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → middleware/tracking.rs (resolve visitor, run handler)
//!         → server.rs forward_handler (origin round trip)
//!     → response.rs (response ⇄ ResponseEnvelope)
//!     → rewrite pipeline, identity cookie
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use middleware::{visitor_tracking_middleware, TrackingState};
pub use server::{HttpServer, ServerError};
