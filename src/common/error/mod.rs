//! Unified error types.
//!
//! This module provides the error type returned by every conversion entry
//! point, folding package-level failures into the conversion taxonomy.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
