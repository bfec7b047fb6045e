//! Game state
//!
//! [`GameState`] is the whole of a game in progress: rosters, lineups, box
//! scores, the clock, the RNG position and the per-game tallies reported to
//! the caller. It is what gets persisted between quarters; restoring it and
//! continuing reproduces the same possessions as an uninterrupted run.
//!
//! Binary blobs are MessagePack + LZ4 + SHA-256 ([`codec`]); older versions
//! are upgraded on load ([`migration`]).

pub mod codec;
pub mod migration;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::engine::config::ClockConfig;
use crate::models::{
    BoxScore, ClutchPlay, DegradedReport, PlayerId, TeamPair, TeamSetup, TeamSide,
};

pub use codec::{from_blob, from_json, from_value, to_blob, to_json};
pub use migration::{migrate_state, needs_migration};

pub const STATE_VERSION: u32 = 4;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted state: {0}")]
    Corrupted(String),

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

impl StateError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StateError::Json(_) => true,
            StateError::Serialization(_) => false,
            StateError::Deserialization(_) => false,
            StateError::Decompression => false,
            StateError::Corrupted(_) => false,
            StateError::ChecksumMismatch => false,
            StateError::VersionMismatch { .. } => false,
        }
    }
}

fn current_version() -> u32 {
    STATE_VERSION
}

fn first_quarter() -> u8 {
    1
}

fn quarter_length() -> f64 {
    ClockConfig::default().quarter_minutes
}

/// Serializable game aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub seed: u64,
    /// ChaCha word position of the engine RNG.
    #[serde(default)]
    pub rng_word_pos: u64,

    pub teams: TeamPair<TeamSetup>,
    #[serde(default)]
    pub lineups: TeamPair<Vec<PlayerId>>,
    #[serde(default)]
    pub box_scores: TeamPair<BoxScore>,
    #[serde(default)]
    pub scores: TeamPair<u32>,
    /// Points per period, one entry per period started; always `quarter`
    /// entries long.
    #[serde(default)]
    pub quarter_scores: TeamPair<Vec<u32>>,

    /// Period being played (1-4 regulation, 5+ overtime). Stays on the
    /// last period once the game is final.
    #[serde(default = "first_quarter")]
    pub quarter: u8,
    /// Minutes left in the current period.
    #[serde(default = "quarter_length")]
    pub clock_minutes: f64,
    #[serde(default)]
    pub possession: TeamSide,
    #[serde(default)]
    pub possession_count: u32,
    /// Possessions played in each period.
    #[serde(default)]
    pub quarter_possessions: Vec<u32>,
    /// Game minutes since the last rotation check.
    #[serde(default)]
    pub rotation_accumulator: f64,
    #[serde(default)]
    pub finished: bool,

    #[serde(default)]
    pub target_minutes: TeamPair<BTreeMap<PlayerId, f64>>,
    #[serde(default)]
    pub starters: TeamPair<Vec<PlayerId>>,
    /// Side under live user control, if any.
    #[serde(default)]
    pub user_team: Option<TeamSide>,
    #[serde(default)]
    pub is_live: bool,

    #[serde(default)]
    pub synergy_counts: TeamPair<BTreeMap<String, u32>>,
    #[serde(default)]
    pub clutch_plays: Vec<ClutchPlay>,
    #[serde(default)]
    pub degraded: DegradedReport,
}

impl GameState {
    /// Fresh state at the opening tip: Q1, full clock, empty box scores.
    /// Lineups and target minutes are filled in by the engine.
    pub fn new(home: TeamSetup, away: TeamSetup, seed: u64, clock: &ClockConfig) -> Self {
        let box_scores = TeamPair::new(BoxScore::for_roster(&home.players), BoxScore::for_roster(&away.players));
        Self {
            version: STATE_VERSION,
            seed,
            rng_word_pos: 0,
            teams: TeamPair::new(home, away),
            lineups: TeamPair::default(),
            box_scores,
            scores: TeamPair::default(),
            quarter_scores: TeamPair::new(vec![0], vec![0]),
            quarter: 1,
            clock_minutes: clock.period_minutes(1),
            possession: TeamSide::Home,
            possession_count: 0,
            quarter_possessions: vec![0],
            rotation_accumulator: 0.0,
            finished: false,
            target_minutes: TeamPair::default(),
            starters: TeamPair::default(),
            user_team: None,
            is_live: false,
            synergy_counts: TeamPair::default(),
            clutch_plays: Vec::new(),
            degraded: DegradedReport::default(),
        }
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.finished
    }

    /// Overtime periods started.
    pub fn overtime_periods(&self, clock: &ClockConfig) -> u8 {
        let started = self.quarter_scores.home.len() as u8;
        started.saturating_sub(clock.regulation_quarters)
    }

    /// Offense score minus defense score.
    pub fn score_differential(&self, side: TeamSide) -> i32 {
        *self.scores.get(side) as i32 - *self.scores.get(side.opponent()) as i32
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        &self.teams.get(side).name
    }

    /// Checks the invariants a restored state must hold.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.quarter == 0 {
            return Err(StateError::Corrupted("quarter must start at 1".to_string()));
        }
        if !self.clock_minutes.is_finite() || self.clock_minutes < 0.0 {
            return Err(StateError::Corrupted(format!("invalid clock {}", self.clock_minutes)));
        }
        for side in TeamSide::BOTH {
            let team = self.teams.get(side);
            if team.players.is_empty() {
                return Err(StateError::Corrupted(format!("{:?} roster is empty", side)));
            }
            let quarter_total: u32 = self.quarter_scores.get(side).iter().sum();
            if quarter_total != *self.scores.get(side) {
                return Err(StateError::Corrupted(format!(
                    "{:?} quarter scores sum to {} but score is {}",
                    side,
                    quarter_total,
                    self.scores.get(side)
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{PlayerSnapshot, Position, TeamSetup};

    /// Twelve-man roster: starters rated 80 down to 76, bench 70 down to 64.
    pub fn roster(prefix: &str) -> TeamSetup {
        let positions = [
            Position::PG,
            Position::SG,
            Position::SF,
            Position::PF,
            Position::C,
            Position::PG,
            Position::SG,
            Position::SF,
            Position::PF,
            Position::C,
            Position::SF,
            Position::PF,
        ];
        let players = positions
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let rating = if i < 5 { 80 - i as u8 } else { 75 - i as u8 };
                PlayerSnapshot::new(format!("{}{}", prefix, i), format!("{} Player {}", prefix, i), *pos, rating)
            })
            .collect();
        TeamSetup::new(prefix, format!("{} Team", prefix), players)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::roster;
    use super::*;

    #[test]
    fn test_new_state_starts_at_tip_off() {
        let state = GameState::new(roster("h"), roster("a"), 7, &ClockConfig::default());
        assert_eq!(state.version, STATE_VERSION);
        assert_eq!(state.quarter, 1);
        assert_eq!(state.clock_minutes, 10.0);
        assert_eq!(state.box_scores.home.lines.len(), 12);
        assert_eq!(state.quarter_scores.away, vec![0]);
        assert!(!state.is_final());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_score_differential() {
        let mut state = GameState::new(roster("h"), roster("a"), 7, &ClockConfig::default());
        state.scores = TeamPair::new(50, 47);
        assert_eq!(state.score_differential(TeamSide::Home), 3);
        assert_eq!(state.score_differential(TeamSide::Away), -3);
    }

    #[test]
    fn test_validate_rejects_mismatched_quarter_scores() {
        let mut state = GameState::new(roster("h"), roster("a"), 7, &ClockConfig::default());
        state.scores.home = 2;
        assert!(matches!(state.validate(), Err(StateError::Corrupted(_))));
    }

    #[test]
    fn test_overtime_periods_from_quarter_scores() {
        let clock = ClockConfig::default();
        let mut state = GameState::new(roster("h"), roster("a"), 7, &clock);
        state.quarter_scores = TeamPair::new(vec![20, 20, 20, 20, 8, 9], vec![20, 20, 20, 20, 8, 7]);
        assert_eq!(state.overtime_periods(&clock), 2);
    }
}
