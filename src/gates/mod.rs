//! Gate catalog for the crowd density emitter.
//!
//! This module holds the fixed set of locations and gates the emitter
//! reports on.

pub mod catalog;

// Re-export commonly used types
pub use catalog::{
    catalog, find_gate, monitored_gates, Coordinates, Gate, GateId, Location, LocationType,
};
