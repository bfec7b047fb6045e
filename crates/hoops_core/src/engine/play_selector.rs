//! Play selection
//!
//! [`PlaySelector`] is the seam between the possession simulator and whatever
//! decides which play a team runs. [`PlaybookSelector`] is the default: a
//! weighted draw over the plays of the current scheme, nudged by the game
//! situation (late-game score, shot clock, opposing zone).

use rand::RngCore;

use super::probability;
use crate::data::Playbook;
use crate::models::{ActionKind, DefensiveScheme, OffensiveScheme, Play, PlayError, PlayTag, PlayerSnapshot};

/// Game situation at the start of a possession.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionContext {
    pub is_transition: bool,
    /// Seconds left on the shot clock when the set starts.
    pub shot_clock_seconds: f64,
    /// Offense score minus defense score.
    pub score_differential: i32,
    pub quarter: u8,
    /// Minutes left in the current period.
    pub time_remaining: f64,
    pub defensive_scheme: DefensiveScheme,
}

impl Default for SelectionContext {
    fn default() -> Self {
        Self {
            is_transition: false,
            shot_clock_seconds: 24.0,
            score_differential: 0,
            quarter: 1,
            time_remaining: 10.0,
            defensive_scheme: DefensiveScheme::Man,
        }
    }
}

impl SelectionContext {
    #[inline]
    pub fn is_late_game(&self) -> bool {
        self.quarter >= 4 && self.time_remaining <= LATE_GAME_MINUTES
    }
}

pub trait PlaySelector {
    fn select_play<'a>(
        &'a self,
        offense: &[&PlayerSnapshot],
        defense: &[&PlayerSnapshot],
        scheme: OffensiveScheme,
        context: &SelectionContext,
        rng: &mut dyn RngCore,
    ) -> &'a Play;
}

// ============================================================================
// Default selector
// ============================================================================

const LATE_GAME_MINUTES: f64 = 2.0;
const LATE_THREE_BOOST: f64 = 3.0;
const QUICK_TWO_BOOST: f64 = 2.5;
const CLOCK_KILLER_BOOST: f64 = 3.0;
const SHORT_CLOCK_SECONDS: f64 = 12.0;
const SHORT_CLOCK_BOOST: f64 = 1.5;
const ZONE_THREE_BOOST: f64 = 1.25;

/// Weighted draw over a validated playbook.
#[derive(Debug, Clone)]
pub struct PlaybookSelector {
    /// Never empty.
    plays: Vec<Play>,
}

impl PlaybookSelector {
    /// Rejects an empty or invalid playbook.
    pub fn new(playbook: Playbook) -> Result<Self, PlayError> {
        playbook.validate()?;
        Ok(Self { plays: playbook.plays })
    }

    /// Selector over the embedded default playbook.
    pub fn embedded() -> Result<Self, PlayError> {
        Self::new(crate::data::default_playbook()?.clone())
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    /// Plays eligible for `scheme`: matching transition flag first, then any
    /// play of the scheme, then the whole book.
    fn candidates(&self, scheme: OffensiveScheme, is_transition: bool) -> Vec<&Play> {
        let exact: Vec<&Play> = self
            .plays
            .iter()
            .filter(|p| p.runs_in(scheme) && p.transition == is_transition)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        let any_phase: Vec<&Play> = self.plays.iter().filter(|p| p.runs_in(scheme)).collect();
        if !any_phase.is_empty() {
            return any_phase;
        }
        self.plays.iter().collect()
    }
}

/// Situational weight for one play.
pub fn situational_weight(play: &Play, context: &SelectionContext) -> f64 {
    let mut weight = play.weight;

    if context.is_late_game() {
        let diff = context.score_differential;
        if diff <= -3 && play.tags.contains(&PlayTag::LateGameThree) {
            weight *= LATE_THREE_BOOST;
        } else if (-2..=-1).contains(&diff) && play.tags.contains(&PlayTag::QuickTwo) {
            weight *= QUICK_TWO_BOOST;
        } else if diff > 0 && play.tags.contains(&PlayTag::ClockKiller) {
            weight *= CLOCK_KILLER_BOOST;
        }
    }

    if context.shot_clock_seconds < SHORT_CLOCK_SECONDS && play.tags.contains(&PlayTag::QuickTwo) {
        weight *= SHORT_CLOCK_BOOST;
    }

    let zone = matches!(context.defensive_scheme, DefensiveScheme::Zone23 | DefensiveScheme::Zone32);
    if zone && play.actions.iter().any(|a| a.kind == ActionKind::ThreePoint) {
        weight *= ZONE_THREE_BOOST;
    }

    weight
}

impl PlaySelector for PlaybookSelector {
    fn select_play<'a>(
        &'a self,
        _offense: &[&PlayerSnapshot],
        _defense: &[&PlayerSnapshot],
        scheme: OffensiveScheme,
        context: &SelectionContext,
        rng: &mut dyn RngCore,
    ) -> &'a Play {
        let candidates = self.candidates(scheme, context.is_transition);
        let weights: Vec<f64> = candidates.iter().map(|p| situational_weight(p, context)).collect();

        // Candidates are never empty, so the draw always lands.
        let index = probability::sample_index(&weights, rng).unwrap_or(0);
        candidates[index]
    }
}
