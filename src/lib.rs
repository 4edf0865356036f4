//! Crowd Density Emitter - synthetic occupancy feed for crowdscan.
//!
//! This library fabricates crowd density readings for a fixed set of gates
//! and posts them to the crowdscan ingest API, one request per gate per
//! cycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Crowd Density Emitter                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │    Gates    │──▶│   Density   │──▶│   Client    │──▶ POST │
//! │  │ (12 fixed)  │   │ [2.5, 9.8]  │   │ (blocking)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                             │                │
//! │                                             ▼                │
//! │                                      ┌─────────────┐        │
//! │                    stdout ◀──────────│   Emitter   │        │
//! │                                      │ (5s cycles) │        │
//! │                                      └─────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use crowd_density_emitter::{BlockingCrowdDataClient, ClientConfig, DensityGenerator, Emitter};
//!
//! let client = BlockingCrowdDataClient::new(ClientConfig::new(
//!     "http://localhost:5000/api/crowd-data",
//! ))
//! .expect("Failed to create client");
//! let mut emitter = Emitter::new(client, DensityGenerator::default());
//!
//! // One pass over all gates, result lines on stdout
//! emitter.send_data(&mut std::io::stdout());
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod emitter;
pub mod gates;
pub mod stats;

#[cfg(feature = "sink")]
pub mod sink;

// Re-export key types at crate root for convenience
pub use client::{
    BlockingCrowdDataClient, ClientConfig, ClientError, CrowdDataClient, TransmitError, Transport,
};
pub use config::{Config, ConfigError};
pub use core::{generate_density, CrowdReading, DensityGenerator, RiskLevel};
pub use emitter::{CycleReport, Emitter, Outcome, RunOptions};
pub use gates::{monitored_gates, GateId};
pub use stats::{EmitterStats, SharedEmitterStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
