//! Game clock configuration

use serde::{Deserialize, Serialize};

/// Period lengths and possession pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Regulation quarter length in minutes (default: 10.0)
    pub quarter_minutes: f64,
    /// Overtime period length in minutes (default: 5.0)
    pub overtime_minutes: f64,
    /// Regulation quarters (default: 4)
    pub regulation_quarters: u8,
    /// Shortest possession in game seconds (default: 10.0)
    pub min_possession_seconds: f64,
    /// Longest possession in game seconds, one shot clock (default: 24.0)
    pub max_possession_seconds: f64,
    /// Game minutes between rotation checks (default: 2.0)
    pub rotation_interval_minutes: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            quarter_minutes: 10.0,
            overtime_minutes: 5.0,
            regulation_quarters: 4,
            min_possession_seconds: 10.0,
            max_possession_seconds: 24.0,
            rotation_interval_minutes: 2.0,
        }
    }
}

impl ClockConfig {
    pub fn regulation_minutes(&self) -> f64 {
        self.quarter_minutes * f64::from(self.regulation_quarters)
    }

    /// Length of `quarter` (1-based; beyond regulation is overtime).
    pub fn period_minutes(&self, quarter: u8) -> f64 {
        if quarter <= self.regulation_quarters {
            self.quarter_minutes
        } else {
            self.overtime_minutes
        }
    }

    /// Game minutes elapsed before `quarter` starts.
    pub fn minutes_before(&self, quarter: u8) -> f64 {
        let q = quarter.saturating_sub(1);
        if q <= self.regulation_quarters {
            self.quarter_minutes * f64::from(q)
        } else {
            self.regulation_minutes() + self.overtime_minutes * f64::from(q - self.regulation_quarters)
        }
    }
}
