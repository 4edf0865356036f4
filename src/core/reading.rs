//! The crowd reading payload.

use crate::gates::GateId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One density reading for one gate, as posted to `/api/crowd-data`.
///
/// Readings are built fresh for each request and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdReading {
    pub location_id: String,
    pub gate_id: String,
    pub density: f64,
}

impl CrowdReading {
    pub fn new(gate: GateId, density: f64) -> Self {
        Self {
            location_id: gate.location_id.to_string(),
            gate_id: gate.gate_id.to_string(),
            density,
        }
    }

    /// Compact JSON form, as sent on the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for CrowdReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
