//! Game engine: quarter loop, rotation checks and overtime.
//!
//! [`GameEngine`] owns one game: its [`GameState`], the seeded RNG, the play
//! selector and the caller-visible event log. Whole games and single periods
//! share the same possession routine, so a game split into periods (and
//! serialized in between) plays out exactly like a game simulated in one call.

use std::collections::{BTreeMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::lineup::{ai_target_minutes, auto_select_lineup, restore_lineup, validate_lineup};
use super::play_executor::PlayContext;
use super::play_selector::{PlaySelector, PlaybookSelector};
use super::possession::{self, PossessionOutcome};
use super::substitutions::{evaluate_substitutions, SubstitutionRequest};
use crate::error::{Result, SimError};
use crate::models::{
    BoxScore, ClutchPlay, DefensiveScheme, DegradedReport, OffensiveScheme, PlayByPlayEntry, PlayerId,
    PossessionAnimation, SubstitutionStrategy, TeamPair, TeamSetup, TeamSide,
};
use crate::state::GameState;

/// Shortest possession the loop will run, so the clock always moves.
const MIN_POSSESSION_SECONDS: f64 = 1.0;
const CLOCK_EPSILON: f64 = 1e-9;

// ============================================================================
// Reports
// ============================================================================

/// Coaching changes applied between periods. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameAdjustments {
    pub lineup: Option<Vec<PlayerId>>,
    pub offensive_scheme: Option<OffensiveScheme>,
    pub defensive_scheme: Option<DefensiveScheme>,
    pub substitution_strategy: Option<SubstitutionStrategy>,
    pub target_minutes: Option<BTreeMap<PlayerId, f64>>,
}

impl GameAdjustments {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Minutes and fatigue a player picked up in this game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameDelta {
    pub player_id: PlayerId,
    pub side: TeamSide,
    pub minutes: f64,
    pub fatigue_gained: f64,
}

/// How a period ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEnd {
    /// The period that just finished (5 = first overtime).
    pub quarter: u8,
    pub period_score: TeamPair<u32>,
    pub scores: TeamPair<u32>,
    /// The game is over.
    pub finished: bool,
}

/// One possession plus the period end it triggered, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PossessionStep {
    pub outcome: PossessionOutcome,
    pub period_end: Option<PeriodEnd>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterReport {
    pub period: PeriodEnd,
    pub play_by_play: Vec<PlayByPlayEntry>,
    pub animations: Vec<PossessionAnimation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub final_score: TeamPair<u32>,
    pub quarter_scores: TeamPair<Vec<u32>>,
    pub overtime_periods: u8,
    pub possessions: u32,
    pub box_scores: TeamPair<BoxScore>,
    pub play_by_play: Vec<PlayByPlayEntry>,
    pub animations: Vec<PossessionAnimation>,
    pub synergy_counts: TeamPair<BTreeMap<String, u32>>,
    pub clutch_plays: Vec<ClutchPlay>,
    /// Last clutch basket by the winning team.
    pub game_winner: Option<ClutchPlay>,
    pub deltas: Vec<PlayerGameDelta>,
    pub degraded: DegradedReport,
}

impl GameReport {
    pub fn winner(&self) -> Option<TeamSide> {
        match self.final_score.home.cmp(&self.final_score.away) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Possession-level output collected since the last drain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameLog {
    pub play_by_play: Vec<PlayByPlayEntry>,
    pub animations: Vec<PossessionAnimation>,
}

// ============================================================================
// Engine
// ============================================================================

pub struct GameEngine<S: PlaySelector = PlaybookSelector> {
    state: GameState,
    rng: ChaCha8Rng,
    selector: S,
    config: EngineConfig,
    ctx: PlayContext,
    log: GameLog,
}

impl GameEngine<PlaybookSelector> {
    /// New game with the default config and the embedded playbook.
    pub fn new(home: TeamSetup, away: TeamSetup, seed: u64) -> Result<Self> {
        Self::with_config(home, away, seed, EngineConfig::default())
    }

    pub fn with_config(home: TeamSetup, away: TeamSetup, seed: u64, config: EngineConfig) -> Result<Self> {
        Self::with_selector(home, away, seed, config, PlaybookSelector::embedded()?)
    }

    /// Resume a saved game with the embedded playbook.
    pub fn from_state(state: GameState, config: EngineConfig) -> Result<Self> {
        Self::from_state_with_selector(state, config, PlaybookSelector::embedded()?)
    }
}

impl<S: PlaySelector> GameEngine<S> {
    pub fn with_selector(home: TeamSetup, away: TeamSetup, seed: u64, config: EngineConfig, selector: S) -> Result<Self> {
        config.validate()?;
        check_rosters(&home, &away)?;

        let mut state = GameState::new(home, away, seed, &config.clock);
        for side in TeamSide::BOTH {
            let team = state.teams.get(side);
            let lineup = auto_select_lineup(side, team)?;
            let targets = ai_target_minutes(team, config.rotation.team_minutes);
            *state.starters.get_mut(side) = lineup.clone();
            *state.lineups.get_mut(side) = lineup;
            *state.target_minutes.get_mut(side) = targets;
        }

        tracing::info!(
            home = %state.teams.home.name,
            away = %state.teams.away.name,
            seed,
            "game created"
        );

        Ok(Self {
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
            selector,
            config,
            ctx: PlayContext::new(),
            log: GameLog::default(),
        })
    }

    /// Resume from a decoded state.
    ///
    /// Stored lineups that no longer hold five healthy rostered players are
    /// replaced (and counted as fallbacks); empty target minutes come from
    /// the AI template. The RNG continues from the stored word position.
    pub fn from_state_with_selector(mut state: GameState, config: EngineConfig, selector: S) -> Result<Self> {
        config.validate()?;
        state.validate()?;
        check_rosters(&state.teams.home, &state.teams.away)?;

        for side in TeamSide::BOTH {
            let team = state.teams.get(side);
            let stored = state.lineups.get(side);
            let (lineup, fallback) = if stored.is_empty() {
                (auto_select_lineup(side, team)?, false)
            } else {
                restore_lineup(side, team, stored)?
            };
            if fallback {
                state.degraded.lineup_fallbacks += 1;
            }
            if state.target_minutes.get(side).is_empty() {
                let targets = ai_target_minutes(team, config.rotation.team_minutes);
                *state.target_minutes.get_mut(side) = targets;
            }
            if state.starters.get(side).is_empty() {
                *state.starters.get_mut(side) = lineup.clone();
            }
            *state.lineups.get_mut(side) = lineup;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(state.seed);
        rng.set_word_pos(u128::from(state.rng_word_pos));

        let mut engine = Self { state, rng, selector, config, ctx: PlayContext::new(), log: GameLog::default() };
        engine.ensure_box_lines();
        if !engine.state.finished && engine.state.clock_minutes <= CLOCK_EPSILON {
            engine.end_period();
        }
        Ok(engine)
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.state.finished
    }

    /// State with the RNG position synced, ready to serialize.
    ///
    /// [`Self::state`] is synced after every possession as well.
    pub fn snapshot_state(&self) -> GameState {
        let mut state = self.state.clone();
        state.rng_word_pos = self.word_pos();
        state
    }

    pub fn into_state(self) -> GameState {
        let word_pos = self.word_pos();
        let mut state = self.state;
        state.rng_word_pos = word_pos;
        state
    }

    fn word_pos(&self) -> u64 {
        u64::try_from(self.rng.get_word_pos()).unwrap_or(u64::MAX)
    }

    /// Drain play-by-play and animation frames recorded so far.
    pub fn take_log(&mut self) -> GameLog {
        std::mem::take(&mut self.log)
    }

    /// Game minutes played so far.
    pub fn elapsed_minutes(&self) -> f64 {
        let clock = &self.config.clock;
        clock.minutes_before(self.state.quarter) + clock.period_minutes(self.state.quarter) - self.state.clock_minutes
    }

    pub fn game_deltas(&self) -> Vec<PlayerGameDelta> {
        let rate = self.config.credit.fatigue_per_minute;
        TeamSide::BOTH
            .into_iter()
            .flat_map(|side| {
                self.state
                    .box_scores
                    .get(side)
                    .lines
                    .iter()
                    .filter(|line| line.minutes > 0.0)
                    .map(move |line| PlayerGameDelta {
                        player_id: line.player_id.clone(),
                        side,
                        minutes: line.minutes,
                        fatigue_gained: line.minutes * rate,
                    })
            })
            .collect()
    }

    // ========== Coaching ==========

    /// Validate and apply coaching changes for one team. Nothing is applied
    /// when any part is invalid.
    pub fn apply_adjustments(&mut self, side: TeamSide, adjustments: &GameAdjustments) -> Result<()> {
        if self.state.finished {
            return Err(SimError::GameFinished);
        }
        let team = self.state.teams.get(side);
        if let Some(lineup) = &adjustments.lineup {
            validate_lineup(team, lineup)?;
        }
        if let Some(targets) = &adjustments.target_minutes {
            for (id, minutes) in targets {
                if team.player(id).is_none() {
                    return Err(SimError::UnknownPlayer(id.clone()));
                }
                if !minutes.is_finite() || *minutes < 0.0 {
                    return Err(SimError::InvalidRoster(format!("target minutes for {} must be >= 0", id)));
                }
            }
        }

        let coaching = &mut self.state.teams.get_mut(side).coaching;
        if let Some(scheme) = adjustments.offensive_scheme {
            coaching.offensive_scheme = scheme;
        }
        if let Some(scheme) = adjustments.defensive_scheme {
            if scheme != coaching.defensive_scheme {
                // Precomputed modifiers belong to the old scheme.
                coaching.defensive_modifiers = None;
            }
            coaching.defensive_scheme = scheme;
        }
        if let Some(strategy) = adjustments.substitution_strategy {
            coaching.substitution_strategy = strategy;
        }
        if let Some(targets) = &adjustments.target_minutes {
            let current = self.state.target_minutes.get_mut(side);
            for (id, minutes) in targets {
                current.insert(id.clone(), *minutes);
            }
        }
        if let Some(lineup) = &adjustments.lineup {
            self.put_lineup(side, lineup.clone());
        }

        tracing::debug!(?side, "adjustments applied");
        Ok(())
    }

    /// Replace a team's five after validating it.
    pub fn set_lineup(&mut self, side: TeamSide, lineup: Vec<PlayerId>) -> Result<()> {
        validate_lineup(self.state.teams.get(side), &lineup)?;
        self.put_lineup(side, lineup);
        Ok(())
    }

    fn put_lineup(&mut self, side: TeamSide, lineup: Vec<PlayerId>) {
        *self.state.lineups.get_mut(side) = lineup;
        self.ensure_box_lines();
    }

    fn ensure_box_lines(&mut self) {
        for side in TeamSide::BOTH {
            let team = self.state.teams.get(side);
            let box_score = self.state.box_scores.get_mut(side);
            for id in self.state.lineups.get(side) {
                if let Some(player) = team.player(id) {
                    box_score.ensure_line(player);
                }
            }
        }
    }

    // ========== Simulation ==========

    /// Play to the final buzzer, overtime included.
    pub fn simulate_game(&mut self) -> Result<GameReport> {
        if self.state.finished {
            return Err(SimError::GameFinished);
        }
        while !self.state.finished {
            self.play_period();
        }
        Ok(self.report())
    }

    /// Play the current period to its end.
    pub fn simulate_quarter(&mut self) -> Result<QuarterReport> {
        if self.state.finished {
            return Err(SimError::GameFinished);
        }
        let period = self.play_period();
        let log = self.take_log();
        Ok(QuarterReport { period, play_by_play: log.play_by_play, animations: log.animations })
    }

    /// One possession; ends the period when it runs out the clock.
    pub fn simulate_possession(&mut self) -> Result<PossessionStep> {
        if self.state.finished {
            return Err(SimError::GameFinished);
        }
        let outcome = self.run_possession();
        let period_end = (self.state.clock_minutes <= CLOCK_EPSILON).then(|| self.end_period());
        Ok(PossessionStep { outcome, period_end })
    }

    /// Final report. Drains the log.
    pub fn report(&mut self) -> GameReport {
        let log = self.take_log();
        let state = &self.state;
        let mut report = GameReport {
            final_score: state.scores.clone(),
            quarter_scores: state.quarter_scores.clone(),
            overtime_periods: state.overtime_periods(&self.config.clock),
            possessions: state.possession_count,
            box_scores: state.box_scores.clone(),
            play_by_play: log.play_by_play,
            animations: log.animations,
            synergy_counts: state.synergy_counts.clone(),
            clutch_plays: state.clutch_plays.clone(),
            game_winner: None,
            deltas: self.game_deltas(),
            degraded: state.degraded,
        };
        let winner = report.winner();
        report.game_winner = report.clutch_plays.iter().rev().find(|play| Some(play.side) == winner).cloned();
        report
    }

    fn play_period(&mut self) -> PeriodEnd {
        while self.state.clock_minutes > CLOCK_EPSILON {
            self.run_possession();
        }
        self.end_period()
    }

    fn run_possession(&mut self) -> PossessionOutcome {
        let clock = &self.config.clock;
        let low = clock.min_possession_seconds.max(MIN_POSSESSION_SECONDS);
        let high = clock.max_possession_seconds.max(low);
        let seconds = self.rng.gen_range(low..=high);
        let duration = (seconds / 60.0).min(self.state.clock_minutes);

        let side = self.state.possession;
        let outcome = possession::simulate_possession(
            &mut self.state,
            side,
            duration,
            &self.selector,
            &self.config,
            &mut self.ctx,
            &mut self.rng,
        );

        self.state.clock_minutes = (self.state.clock_minutes - duration).max(0.0);
        if self.state.clock_minutes <= CLOCK_EPSILON {
            self.state.clock_minutes = 0.0;
        }
        if !outcome.offensive_rebound {
            self.state.possession = side.opponent();
        }

        self.state.rotation_accumulator += duration;
        let interval = self.config.clock.rotation_interval_minutes;
        if interval > 0.0 {
            while self.state.rotation_accumulator >= interval {
                self.state.rotation_accumulator -= interval;
                if self.state.clock_minutes > 0.0 {
                    self.rotate();
                }
            }
        }

        self.log.play_by_play.push(outcome.entry.clone());
        if let Some(animation) = &outcome.animation {
            self.log.animations.push(animation.clone());
        }
        self.state.rng_word_pos = self.word_pos();
        outcome
    }

    /// Rotation check for both teams.
    fn rotate(&mut self) {
        let elapsed = self.elapsed_minutes();
        for side in TeamSide::BOTH {
            let state = &self.state;
            let team = state.teams.get(side);
            let request = SubstitutionRequest {
                lineup: state.lineups.get(side),
                team,
                box_score: state.box_scores.get(side),
                target_minutes: state.target_minutes.get(side),
                strategy: team.coaching.substitution_strategy,
                quarter: state.quarter,
                time_remaining: state.clock_minutes,
                score_differential: state.score_differential(side),
                elapsed_minutes: elapsed,
                user_controlled_live: state.is_live && state.user_team == Some(side),
            };
            if let Some(lineup) = evaluate_substitutions(&request, &self.config) {
                self.put_lineup(side, lineup);
            }
        }
    }

    /// Close the current period: finish the game or open the next period.
    fn end_period(&mut self) -> PeriodEnd {
        let state = &mut self.state;
        let clock = &self.config.clock;
        let quarter = state.quarter;
        let index = usize::from(quarter.max(1)) - 1;
        let period_score = TeamPair::new(
            state.quarter_scores.home.get(index).copied().unwrap_or(0),
            state.quarter_scores.away.get(index).copied().unwrap_or(0),
        );

        state.clock_minutes = 0.0;
        if quarter >= clock.regulation_quarters && state.scores.home != state.scores.away {
            state.finished = true;
            tracing::info!(
                home = state.scores.home,
                away = state.scores.away,
                overtime = state.overtime_periods(clock),
                possessions = state.possession_count,
                "game final"
            );
        } else {
            state.quarter += 1;
            state.clock_minutes = clock.period_minutes(state.quarter);
            state.quarter_scores.home.push(0);
            state.quarter_scores.away.push(0);
            state.quarter_possessions.push(0);
            if state.quarter > clock.regulation_quarters {
                tracing::info!(
                    period = state.quarter,
                    score = state.scores.home,
                    "tied after regulation; overtime"
                );
            } else {
                tracing::info!(
                    quarter,
                    home = state.scores.home,
                    away = state.scores.away,
                    "end of quarter"
                );
            }
        }

        PeriodEnd { quarter, period_score, scores: state.scores.clone(), finished: state.finished }
    }
}

/// Both rosters hold five healthy players and no id appears on both.
fn check_rosters(home: &TeamSetup, away: &TeamSetup) -> Result<()> {
    let home_ids: HashSet<&str> = home.players.iter().map(|p| p.id.as_str()).collect();
    if home_ids.len() != home.players.len() {
        return Err(SimError::InvalidRoster(format!("{} lists a player twice", home.name)));
    }
    let away_ids: HashSet<&str> = away.players.iter().map(|p| p.id.as_str()).collect();
    if away_ids.len() != away.players.len() {
        return Err(SimError::InvalidRoster(format!("{} lists a player twice", away.name)));
    }
    if let Some(shared) = home_ids.intersection(&away_ids).next() {
        return Err(SimError::InvalidRoster(format!("{} is on both rosters", shared)));
    }
    Ok(())
}
