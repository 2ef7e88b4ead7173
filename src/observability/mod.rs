//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware + pipeline produce:
//!     → logging.rs (structured tracing events, pretty or JSON)
//!     → metrics.rs (counters behind the `metrics` facade)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The request ID set by the server's request-id layer shows up on every
//! event through the `TraceLayer` span.

pub mod logging;
pub mod metrics;
