//! Talkable visitor tracking injector.
//!
//! Wraps an HTTP handler, resolves a long-lived visitor identifier for every
//! request and rewrites successful HTML responses to carry a sync beacon
//! after `<body>` and the integration script before `</head>`.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::{InjectorConfig, TrackingConfig};
pub use http::{visitor_tracking_middleware, HttpServer, TrackingState};
pub use identity::VisitorIdentity;
pub use lifecycle::Shutdown;
pub use rewrite::Pipeline;
