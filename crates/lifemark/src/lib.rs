//! Top-level facade crate for lifemark.
//!
//! Re-exports the core timer and the axum integration so users can depend on a single crate.

pub mod core {
    pub use lifemark_core::*;
}

pub mod axum {
    pub use lifemark_axum::*;
}
