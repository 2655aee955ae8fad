//! Result type used across the planner library.
//!
//! Library code returns the typed [`PlannerError`] so that callers can tell a
//! missing file apart from a missing *required* file, or a path traversal
//! attempt apart from a malformed manifest. The binary converts these into
//! `color_eyre` reports at the edge.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::result::Result;
//!
//! fn example_function() -> Result<String> {
//!     Ok("success".to_string())
//! }
//! ```

use crate::error::PlannerError;

/// Standard result type used throughout releasaurus-planner.
pub type Result<T> = std::result::Result<T, PlannerError>;
