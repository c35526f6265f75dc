//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Printing messages and emitted text

pub mod output;
