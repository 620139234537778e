//! Lightweight in-process metrics.
//!
//! Values are plain atomics rendered by the `/metrics` handler in Prometheus
//! text format; no exporter crate is involved.

pub mod metrics;

pub use metrics::ServiceMetrics;
