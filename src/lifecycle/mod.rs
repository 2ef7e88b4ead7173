//! Process lifecycle: startup wiring lives in `main`, graceful stop here.
//!
//! On Ctrl+C the binary triggers [`Shutdown`]; the HTTP server stops
//! accepting, drains in-flight requests, then `run` returns.

pub mod shutdown;

pub use shutdown::Shutdown;
