//! Mirra Runtime - The host-facing motion service
//!
//! Everything a server, CLI or batch job needs around the algorithms:
//! 1. Per-frame pipeline (smooth, then compute angles)
//! 2. Offline extraction pass over detector output
//! 3. Reference corpus loading (JSONL frames, CSV angle tables)
//! 4. Shared service state with serialized mutation
//! 5. Configuration and logging setup
//!
//! Blocking I/O (corpus loads) always happens before a lock is taken; the
//! critical sections only swap in fully materialized data.

pub mod config;
pub mod corpus;
pub mod observability;
pub mod pipeline;
pub mod service;

pub use config::*;
pub use corpus::*;
pub use observability::*;
pub use pipeline::*;
pub use service::*;
