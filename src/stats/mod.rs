//! Session statistics for the emitter.
//!
//! Counters are kept in memory only and summarised when the emitter stops.

pub mod session;

// Re-export commonly used types
pub use session::{create_shared_stats, EmitterStats, SharedEmitterStats, StatsSnapshot};
