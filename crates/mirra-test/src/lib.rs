//! Mirra Test Harness - Synthetic performances and end-to-end scenarios
//!
//! This crate provides:
//! - A seeded performer simulator (landmark frames, detector noise, dropouts)
//! - Reference recording through the offline extraction pass
//! - Live session and offline comparison scenarios

pub mod integration;
pub mod simulator;

pub use integration::*;
pub use simulator::*;
