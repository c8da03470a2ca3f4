//! Utility functions.
//!
//! Logging configuration and small dense numerical helpers.

pub mod logging;
pub mod numerics;
