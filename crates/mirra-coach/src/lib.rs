//! Mirra Coach - Session analytics engine
//!
//! Consumes the stream of per-frame scores for one practice session:
//! - Rolling window of the last observations
//! - Trend classification (starting, improving, declining, stable)
//! - Per joint-group accuracy of the live frame
//! - Rule-based coaching insights
//! - Deterministic keyword chat responder
//!
//! Nothing here is persisted; a session lives until the next `start_session`.

pub mod chat;
pub mod insight;
pub mod joints;
pub mod profile;
pub mod session;
pub mod window;

pub use chat::*;
pub use insight::*;
pub use joints::*;
pub use profile::*;
pub use session::*;
pub use window::*;
