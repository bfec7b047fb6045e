//! Rotation and box-score crediting configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Score margin that triggers the closing lineup (default: 6)
    pub close_game_threshold: u32,
    /// Minutes left in Q4/OT when the closing lineup can trigger (default: 5.0)
    pub close_game_minutes: f64,
    /// Team minutes distributed by the AI target template (default: 200.0)
    pub team_minutes: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { close_game_threshold: 6, close_game_minutes: 5.0, team_minutes: 200.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    /// Chance a made basket is assisted at neutral chemistry (default: 0.55)
    pub base_assist_rate: f64,
    /// Chance a non-steal turnover still credits a steal (default: 0.45)
    pub base_steal_credit: f64,
    /// Chemistry points per unit of rate shift (default: 500.0)
    pub chemistry_divisor: f64,
    /// Final minutes of Q4/OT where made baskets are checked as clutch (default: 2.0)
    pub clutch_minutes: f64,
    /// Largest post-basket margin for a clutch play (default: 3)
    pub clutch_margin: u32,
    /// Fatigue gained per minute played, reported to the caller (default: 0.75)
    pub fatigue_per_minute: f64,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            base_assist_rate: 0.55,
            base_steal_credit: 0.45,
            chemistry_divisor: 500.0,
            clutch_minutes: 2.0,
            clutch_margin: 3,
            fatigue_per_minute: 0.75,
        }
    }
}

impl CreditConfig {
    /// Base rate shifted by chemistry (50 = neutral), clamped to [0.05, 0.95].
    pub fn chemistry_rate(&self, base: f64, chemistry: f64) -> f64 {
        let divisor = if self.chemistry_divisor.abs() < f64::EPSILON { 1.0 } else { self.chemistry_divisor };
        (base + (chemistry - 50.0) / divisor).clamp(0.05, 0.95)
    }
}
