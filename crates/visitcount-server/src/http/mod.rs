//! HTTP surface: the counter endpoint and its CORS layer.

pub mod cors;
pub mod visits;

pub use cors::CorsPolicy;
pub use visits::{preflight, record_visit, CountBody, VisitError, FAILURE_MESSAGE};
