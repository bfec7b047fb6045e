//! Outcome probability configuration

use serde::{Deserialize, Serialize};

/// Parameters for outcome modification and role assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityConfig {
    /// Floor applied before normalisation (default: 0.05)
    pub min_probability: f64,
    /// Ceiling applied before normalisation (default: 0.95)
    pub max_probability: f64,
    /// Advantage points per unit of probability (default: 200.0)
    pub advantage_divisor: f64,
    /// Badge boost scale into advantage points (default: 10.0)
    pub badge_advantage_scale: f64,
    /// Rating lost at 100 fatigue, as a fraction (default: 0.10)
    pub max_fatigue_penalty: f64,
    /// Rating points per morale point away from 50 (default: 0.05)
    pub morale_scale: f64,
    /// Safety cap on actions walked per play (default: 20)
    pub max_play_steps: usize,
    /// Chance the best-fit candidate takes a role (default: 0.70)
    pub role_best_share: f64,
    /// Chance the second-best candidate takes a role (default: 0.25)
    pub role_second_share: f64,
    /// Free-throw make chance bounds
    pub min_free_throw: f64,
    pub max_free_throw: f64,
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.05,
            max_probability: 0.95,
            advantage_divisor: 200.0,
            badge_advantage_scale: 10.0,
            max_fatigue_penalty: 0.10,
            morale_scale: 0.05,
            max_play_steps: 20,
            role_best_share: 0.70,
            role_second_share: 0.25,
            min_free_throw: 0.40,
            max_free_throw: 0.95,
        }
    }
}

/// Rebound battle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReboundConfig {
    /// Weight multiplier on the defense's rebounding strength (default: 2.5)
    pub defensive_advantage: f64,
    /// Offensive rebound chance floor (default: 0.15)
    pub min_offensive_chance: f64,
    /// Offensive rebound chance ceiling (default: 0.40)
    pub max_offensive_chance: f64,
}

impl Default for ReboundConfig {
    fn default() -> Self {
        Self { defensive_advantage: 2.5, min_offensive_chance: 0.15, max_offensive_chance: 0.40 }
    }
}
