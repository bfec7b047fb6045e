//! User-controlled live game.
//!
//! The user's team is never rotated by the AI; the user substitutes between
//! possessions instead. The opponent keeps its automatic rotation.

use super::game::{GameEngine, GameReport, PeriodEnd, QuarterReport};
use super::play_selector::{PlaySelector, PlaybookSelector};
use crate::error::{Result, SimError};
use crate::models::{PlayByPlayEntry, PlayerId, TeamSide};
use crate::state::GameState;

/// Result of one [`LiveGame::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiveStep {
    Possession(PlayByPlayEntry),
    QuarterEnd { entry: PlayByPlayEntry, period: PeriodEnd },
    Final { entry: PlayByPlayEntry, report: Box<GameReport> },
}

impl LiveStep {
    pub fn entry(&self) -> &PlayByPlayEntry {
        match self {
            LiveStep::Possession(entry) => entry,
            LiveStep::QuarterEnd { entry, .. } => entry,
            LiveStep::Final { entry, .. } => entry,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, LiveStep::Final { .. })
    }
}

pub struct LiveGame<S: PlaySelector = PlaybookSelector> {
    engine: GameEngine<S>,
}

impl<S: PlaySelector> LiveGame<S> {
    pub fn new(mut engine: GameEngine<S>, user_team: TeamSide) -> Self {
        let state = engine.state_mut();
        state.user_team = Some(user_team);
        state.is_live = true;
        tracing::info!(?user_team, "live game started");
        Self { engine }
    }

    pub fn user_team(&self) -> TeamSide {
        self.engine.state().user_team.unwrap_or_default()
    }

    pub fn engine(&self) -> &GameEngine<S> {
        &self.engine
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn lineup(&self) -> &[PlayerId] {
        self.engine.state().lineups.get(self.user_team())
    }

    /// Swap one on-court player for one off the court.
    pub fn substitute(&mut self, outgoing: &str, incoming: &str) -> Result<()> {
        if self.engine.is_final() {
            return Err(SimError::GameFinished);
        }
        let side = self.user_team();
        let mut lineup = self.lineup().to_vec();
        let slot = lineup
            .iter()
            .position(|id| id == outgoing)
            .ok_or_else(|| SimError::InvalidLineup(format!("{} is not on the court", outgoing)))?;
        if lineup.iter().any(|id| id == incoming) {
            return Err(SimError::InvalidLineup(format!("{} is already on the court", incoming)));
        }
        lineup[slot] = incoming.to_string();
        self.engine.set_lineup(side, lineup)?;
        tracing::debug!(outgoing, incoming, "user substitution");
        Ok(())
    }

    pub fn set_lineup(&mut self, lineup: Vec<PlayerId>) -> Result<()> {
        if self.engine.is_final() {
            return Err(SimError::GameFinished);
        }
        let side = self.user_team();
        self.engine.set_lineup(side, lineup)
    }

    /// Run one possession.
    pub fn step(&mut self) -> Result<LiveStep> {
        let step = self.engine.simulate_possession()?;
        let entry = step.outcome.entry;
        Ok(match step.period_end {
            None => LiveStep::Possession(entry),
            Some(period) if period.finished => LiveStep::Final { entry, report: Box::new(self.engine.report()) },
            Some(period) => LiveStep::QuarterEnd { entry, period },
        })
    }

    /// Run the rest of the current period.
    pub fn step_quarter(&mut self) -> Result<QuarterReport> {
        self.engine.simulate_quarter()
    }

    /// Leave live mode and hand back the state.
    pub fn into_state(self) -> GameState {
        let mut state = self.engine.into_state();
        state.is_live = false;
        state
    }
}
