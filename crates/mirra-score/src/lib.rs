//! Mirra Score - How close is the performer to the reference?
//!
//! Two independent comparators:
//! - Frame scoring: one live frame against one reference frame, best effort,
//!   never fails (degenerate input scores 0)
//! - Series comparison: offline, two whole angle tables resampled onto a
//!   common time grid and compared by cosine similarity

pub mod frame;
pub mod series;

pub use frame::*;
pub use series::*;
