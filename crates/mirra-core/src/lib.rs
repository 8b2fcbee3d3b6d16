//! Mirra Core - Fundamental motion types and primitives
//!
//! This crate defines the types shared by every Mirra component:
//! - Landmarks and landmark frames (raw and smoothed)
//! - Versioned skeleton layouts (key points, joint groups, angle triplets)
//! - EMA landmark smoothing
//! - Joint angle calculation
//! - On-disk record formats (JSONL pose frames, CSV angle tables)

pub mod angles;
pub mod error;
pub mod landmark;
pub mod record;
pub mod skeleton;
pub mod smoothing;

pub use angles::*;
pub use error::*;
pub use landmark::*;
pub use record::*;
pub use skeleton::*;
pub use smoothing::*;
