//! visitcount server library entry.
//!
//! Wires config, the document store backends, the CORS layer and the HTTP
//! handlers into an axum service. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod http;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
