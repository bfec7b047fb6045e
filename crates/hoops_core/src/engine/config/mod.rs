//! # Engine Configuration
//!
//! Every tuning constant of the simulation lives here.
//!
//! ```rust
//! use hoops_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let fast = EngineConfig::fast_paced();
//! assert!(fast.clock.max_possession_seconds < config.clock.max_possession_seconds);
//! ```

mod clock_config;
mod probability_config;
mod rotation_config;

pub use clock_config::ClockConfig;
pub use probability_config::{ProbabilityConfig, ReboundConfig};
pub use rotation_config::{CreditConfig, RotationConfig};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Shortest non-zero gap between rotation checks.
pub const MIN_ROTATION_INTERVAL_MINUTES: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub clock: ClockConfig,
    pub probability: ProbabilityConfig,
    pub rebound: ReboundConfig,
    pub rotation: RotationConfig,
    pub credit: CreditConfig,
    /// Record keyframes for every possession
    pub record_animation: bool,
    /// Attach a running box score to every animation entry
    pub record_box_snapshots: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            probability: ProbabilityConfig::default(),
            rebound: ReboundConfig::default(),
            rotation: RotationConfig::default(),
            credit: CreditConfig::default(),
            record_animation: true,
            record_box_snapshots: true,
        }
    }
}

impl EngineConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Shorter possessions, more of them.
    pub fn fast_paced() -> Self {
        let mut cfg = Self::default();
        cfg.clock.min_possession_seconds = 8.0;
        cfg.clock.max_possession_seconds = 18.0;
        cfg
    }

    /// No animation payload; for batch simulation and benches.
    pub fn headless() -> Self {
        let mut cfg = Self::default();
        cfg.record_animation = false;
        cfg.record_box_snapshots = false;
        cfg
    }

    /// Parses and validates a config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Bounds must be ordered and lengths positive; a config that fails
    /// here would panic in a clamp or stall the clock.
    pub fn validate(&self) -> Result<()> {
        let clock = &self.clock;
        require(clock.quarter_minutes.is_finite() && clock.quarter_minutes > 0.0, "clock.quarter_minutes must be > 0")?;
        require(clock.overtime_minutes.is_finite() && clock.overtime_minutes > 0.0, "clock.overtime_minutes must be > 0")?;
        require(clock.regulation_quarters > 0, "clock.regulation_quarters must be at least 1")?;
        require(
            clock.min_possession_seconds.is_finite() && clock.min_possession_seconds >= 0.0,
            "clock.min_possession_seconds must be >= 0",
        )?;
        require(
            clock.max_possession_seconds.is_finite() && clock.max_possession_seconds >= clock.min_possession_seconds,
            "clock.max_possession_seconds must be >= min_possession_seconds",
        )?;
        require(
            clock.rotation_interval_minutes == 0.0 || clock.rotation_interval_minutes >= MIN_ROTATION_INTERVAL_MINUTES,
            "clock.rotation_interval_minutes must be 0 (off) or at least 0.5",
        )?;
        require(clock.rotation_interval_minutes.is_finite(), "clock.rotation_interval_minutes must be finite")?;

        let prob = &self.probability;
        require(ordered_unit(prob.min_probability, prob.max_probability), "probability bounds must satisfy 0 <= min <= max <= 1")?;
        require(ordered_unit(prob.min_free_throw, prob.max_free_throw), "free throw bounds must satisfy 0 <= min <= max <= 1")?;
        require(prob.advantage_divisor.is_finite() && prob.advantage_divisor > 0.0, "probability.advantage_divisor must be > 0")?;
        require(prob.badge_advantage_scale.is_finite(), "probability.badge_advantage_scale must be finite")?;
        require(
            (0.0..=1.0).contains(&prob.max_fatigue_penalty),
            "probability.max_fatigue_penalty must be within [0, 1]",
        )?;
        require(prob.morale_scale.is_finite(), "probability.morale_scale must be finite")?;
        require(prob.max_play_steps > 0, "probability.max_play_steps must be at least 1")?;
        require(
            prob.role_best_share >= 0.0
                && prob.role_second_share >= 0.0
                && prob.role_best_share + prob.role_second_share <= 1.0,
            "role shares must be >= 0 and sum to at most 1",
        )?;

        let rebound = &self.rebound;
        require(
            ordered_unit(rebound.min_offensive_chance, rebound.max_offensive_chance),
            "rebound bounds must satisfy 0 <= min <= max <= 1",
        )?;
        require(
            rebound.defensive_advantage.is_finite() && rebound.defensive_advantage >= 0.0,
            "rebound.defensive_advantage must be >= 0",
        )?;

        let rotation = &self.rotation;
        require(rotation.team_minutes.is_finite() && rotation.team_minutes >= 0.0, "rotation.team_minutes must be >= 0")?;
        require(
            rotation.close_game_minutes.is_finite() && rotation.close_game_minutes >= 0.0,
            "rotation.close_game_minutes must be >= 0",
        )?;

        let credit = &self.credit;
        for (rate, name) in [(credit.base_assist_rate, "credit.base_assist_rate"), (credit.base_steal_credit, "credit.base_steal_credit")] {
            require((0.0..=1.0).contains(&rate), &format!("{} must be within [0, 1]", name))?;
        }
        require(credit.chemistry_divisor.is_finite() && credit.chemistry_divisor > 0.0, "credit.chemistry_divisor must be > 0")?;
        require(credit.clutch_minutes.is_finite() && credit.clutch_minutes >= 0.0, "credit.clutch_minutes must be >= 0")?;
        require(
            credit.fatigue_per_minute.is_finite() && credit.fatigue_per_minute >= 0.0,
            "credit.fatigue_per_minute must be >= 0",
        )?;
        Ok(())
    }
}

fn ordered_unit(min: f64, max: f64) -> bool {
    (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max) && min <= max
}

fn require(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.clock.quarter_minutes, 10.0);
        assert_eq!(cfg.clock.overtime_minutes, 5.0);
        assert_eq!(cfg.probability.max_play_steps, 20);
        assert_eq!(cfg.rebound.defensive_advantage, 2.5);
        assert_eq!(cfg.rotation.close_game_threshold, 6);
    }

    #[test]
    fn test_period_lengths() {
        let clock = ClockConfig::default();
        assert_eq!(clock.period_minutes(1), 10.0);
        assert_eq!(clock.period_minutes(5), 5.0);
        assert_eq!(clock.minutes_before(1), 0.0);
        assert_eq!(clock.minutes_before(5), 40.0);
        assert_eq!(clock.minutes_before(7), 50.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = EngineConfig::from_json(r#"{"rotation": {"close_game_threshold": 3}}"#).unwrap();
        assert_eq!(cfg.rotation.close_game_threshold, 3);
        assert_eq!(cfg.rotation.close_game_minutes, 5.0);
        assert!(cfg.record_animation);
    }

    #[test]
    fn test_chemistry_rate() {
        let credit = CreditConfig::default();
        assert_eq!(credit.chemistry_rate(0.55, 50.0), 0.55);
        assert!(credit.chemistry_rate(0.55, 100.0) > 0.55);
        assert!(credit.chemistry_rate(0.55, 0.0) < 0.55);
    }

    #[test]
    fn test_presets_validate() {
        for cfg in [EngineConfig::default(), EngineConfig::fast_paced(), EngineConfig::headless()] {
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = EngineConfig::from_json(r#"{"probability": {"min_probability": 0.9, "max_probability": 0.1}}"#)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));

        let mut cfg = EngineConfig::default();
        cfg.rebound.min_offensive_chance = 0.5;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));

        let mut cfg = EngineConfig::default();
        cfg.probability.min_free_throw = 0.99;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_clock_lengths_checked() {
        let mut cfg = EngineConfig::default();
        cfg.clock.rotation_interval_minutes = 1e-9;
        assert!(cfg.validate().is_err());
        cfg.clock.rotation_interval_minutes = 0.0;
        cfg.validate().unwrap();

        let mut cfg = EngineConfig::default();
        cfg.clock.quarter_minutes = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.clock.min_possession_seconds = 30.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_headless_preset() {
        let cfg = EngineConfig::headless();
        assert!(!cfg.record_animation);
        assert!(!cfg.record_box_snapshots);
    }
}
