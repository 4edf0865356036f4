//! Risk classification for gate densities.
//!
//! These are the thresholds the crowdscan backend applies when it builds
//! risk summaries. A gate's risk depends on its latest density and the
//! change since the previous reading.

use serde::Serialize;
use std::fmt;

/// Risk tier for a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    High,
    Critical,
    Stampede,
}

impl RiskLevel {
    /// Density at or above which a gate is critical.
    pub const CRITICAL_DENSITY: f64 = 9.0;
    /// Density at or above which a gate is high risk.
    pub const HIGH_DENSITY: f64 = 8.0;
    /// Density at or above which a gate is moderate risk.
    pub const MODERATE_DENSITY: f64 = 6.0;
    /// Rise between readings that turns a critical gate into a stampede risk.
    pub const STAMPEDE_TREND: f64 = 1.5;

    /// Classify a gate from its latest and previous density.
    ///
    /// With no previous reading the trend is zero.
    pub fn classify(latest: f64, previous: Option<f64>) -> Self {
        let trend = latest - previous.unwrap_or(latest);

        if latest >= Self::CRITICAL_DENSITY && trend >= Self::STAMPEDE_TREND {
            RiskLevel::Stampede
        } else if latest >= Self::CRITICAL_DENSITY {
            RiskLevel::Critical
        } else if latest >= Self::HIGH_DENSITY {
            RiskLevel::High
        } else if latest >= Self::MODERATE_DENSITY {
            RiskLevel::Moderate
        } else {
            RiskLevel::Safe
        }
    }

    /// Human-readable tag.
    pub fn tag(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical Risk",
            RiskLevel::Stampede => "Stampede Risk",
        }
    }

    /// Numeric level, 1 (safe) to 5 (stampede).
    pub fn level(&self) -> u8 {
        match self {
            RiskLevel::Safe => 1,
            RiskLevel::Moderate => 2,
            RiskLevel::High => 3,
            RiskLevel::Critical => 4,
            RiskLevel::Stampede => 5,
        }
    }

    /// Map color used by the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "green",
            RiskLevel::Moderate => "yellow",
            RiskLevel::High => "orange",
            RiskLevel::Critical => "darkred",
            RiskLevel::Stampede => "red",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Gate counts per risk tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub total: u64,
    pub safe: u64,
    pub moderate: u64,
    pub high: u64,
    pub critical: u64,
    pub stampede: u64,
}

impl RiskCounts {
    pub fn record(&mut self, level: RiskLevel) {
        self.total += 1;
        match level {
            RiskLevel::Safe => self.safe += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::Stampede => self.stampede += 1,
        }
    }

    /// Share of gates in `level`, formatted like `"25.0%"`.
    ///
    /// An empty count reports `"0.0%"`.
    pub fn percentage(&self, level: RiskLevel) -> String {
        let count = match level {
            RiskLevel::Safe => self.safe,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
            RiskLevel::Stampede => self.stampede,
        };
        let pct = if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        };
        format!("{pct:.1}%")
    }
}
