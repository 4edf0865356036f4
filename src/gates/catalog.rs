//! Seeded locations and gates monitored by the emitter.
//!
//! The catalog mirrors the locations seeded into the crowdscan database.
//! Identifiers are fixed at compile time; nothing here changes at runtime.

use serde::Serialize;
use std::fmt;

/// Kind of venue a location represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Stadium,
    Metro,
    Mall,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Stadium => write!(f, "stadium"),
            LocationType::Metro => write!(f, "metro"),
            LocationType::Mall => write!(f, "mall"),
        }
    }
}

/// WGS84 position of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Identifies one physical gate: `(locationId, gateId)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateId {
    pub location_id: &'static str,
    pub gate_id: &'static str,
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location_id, self.gate_id)
    }
}

/// A gate with its display metadata.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub gate_id: &'static str,
    pub name: &'static str,
    pub coordinates: Coordinates,
}

/// A seeded location and its gates.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: &'static str,
    pub location_name: &'static str,
    pub location_type: LocationType,
    pub gates: &'static [Gate],
}

impl Location {
    /// Identifiers of this location's gates, in declared order.
    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> + '_ {
        self.gates.iter().map(|g| GateId {
            location_id: self.location_id,
            gate_id: g.gate_id,
        })
    }
}

const fn gate(gate_id: &'static str, name: &'static str, lat: f64, lng: f64) -> Gate {
    Gate {
        gate_id,
        name,
        coordinates: Coordinates { lat, lng },
    }
}

static STADIUM_GATES: [Gate; 4] = [
    gate("G1", "North Gate", 12.9784, 77.5996),
    gate("G2", "South Gate", 12.9762, 77.5990),
    gate("G3", "East Gate", 12.9775, 77.6010),
    gate("G4", "West Gate", 12.9770, 77.5975),
];

static METRO_GATES: [Gate; 4] = [
    gate("G1", "Entry Gate 1", 12.9758, 77.6101),
    gate("G2", "Entry Gate 2", 12.9760, 77.6095),
    gate("G3", "Exit Gate 1", 12.9762, 77.6103),
    gate("G4", "Exit Gate 2", 12.9756, 77.6098),
];

static MALL_GATES: [Gate; 4] = [
    gate("G1", "Main Entrance", 13.0116, 77.5556),
    gate("G2", "Parking Entrance", 13.0120, 77.5560),
    gate("G3", "Food Court Entrance", 13.0118, 77.5558),
    gate("G4", "Emergency Exit", 13.0114, 77.5552),
];

static LOCATIONS: [Location; 3] = [
    Location {
        location_id: "stadium1",
        location_name: "M. Chinnaswamy Stadium",
        location_type: LocationType::Stadium,
        gates: &STADIUM_GATES,
    },
    Location {
        location_id: "metro1",
        location_name: "MG Road Metro Station",
        location_type: LocationType::Metro,
        gates: &METRO_GATES,
    },
    Location {
        location_id: "mall1",
        location_name: "Orion Mall",
        location_type: LocationType::Mall,
        gates: &MALL_GATES,
    },
];

/// All seeded locations.
pub fn catalog() -> &'static [Location] {
    &LOCATIONS
}

/// The gates the emitter reports on each cycle, in send order.
pub fn monitored_gates() -> Vec<GateId> {
    LOCATIONS.iter().flat_map(|l| l.gate_ids()).collect()
}

/// Look up a gate's metadata by its identifiers.
pub fn find_gate(location_id: &str, gate_id: &str) -> Option<(&'static Location, &'static Gate)> {
    let location = LOCATIONS.iter().find(|l| l.location_id == location_id)?;
    let gate = location.gates.iter().find(|g| g.gate_id == gate_id)?;
    Some((location, gate))
}
