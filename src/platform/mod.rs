//! Platform-specific functionality.

pub mod dart;
