//! # Sandiq Support
//!
//! Shared utilities for the Sandiq DI container.
//!
//! This crate provides:
//! - Text rendering for resolution chains and error messages
//! - "Did you mean?" suggestions for unknown identifiers

pub mod rendering;
