//! Top-level facade crate for visitcount.
//!
//! Re-exports the counter domain and the server library so users can depend on a single crate.

pub mod core {
    pub use visitcount_core::*;
}

pub mod server {
    pub use visitcount_server::*;
}
