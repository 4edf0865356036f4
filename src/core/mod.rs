//! Core functionality for the crowd density emitter.
//!
//! This module contains:
//! - Density generation for synthetic readings
//! - The reading payload posted to the ingest API
//! - Risk classification applied to density values

pub mod density;
pub mod reading;
pub mod risk;

// Re-export commonly used types
pub use density::{generate_density, round_density, DensityGenerator, DENSITY_MAX, DENSITY_MIN};
pub use reading::CrowdReading;
pub use risk::{RiskCounts, RiskLevel};
