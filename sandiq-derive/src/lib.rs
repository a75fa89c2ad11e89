//! Derive macros for Sandiq.
//!
//! Re-exported by the `sandiq` facade; depend on that instead.

pub use sandiq_macros::*;
