//! Observability infrastructure for the MultiChzzk edge handler.
//!
//! This crate provides `StructuredLogger`, a per-request logger that tags
//! every line with the request ID, workload and route.

mod logging;

pub use logging::*;

// Re-export from edge-core for convenience
pub use edge_core::{LogFormat, RequestId};
