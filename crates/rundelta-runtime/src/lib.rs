//! rundelta Runtime - Session orchestration
//!
//! One session task per document:
//! 1. Receive decoded events from the transport
//! 2. Apply them to the document, one at a time
//! 3. Arm, replace, and cancel sweep timers
//! 4. Feed fired timers back through the same event channel
//! 5. Publish snapshots to renderers

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use session::*;
