//! JSON entry points.
//!
//! Requests carry raw roster records (normalised by the roster adapter) or a
//! saved game state; responses carry the wire box score, play-by-play, the
//! animation payload and the state to send back for the next call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, GameAdjustments, GameEngine, PlayerGameDelta};
use crate::error::SimError;
use crate::models::{
    ClutchPlay, CoachingSettings, DegradedReport, PlayByPlayEntry, PossessionAnimation, RawPlayerRecord, TeamPair,
    TeamSetup, TeamSide, TeamTotals, WireBoxScoreLine,
};
use crate::state::{self, GameState};

pub const API_SCHEMA_VERSION: u8 = 1;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TeamData {
    #[serde(alias = "teamId", alias = "team_id")]
    pub id: String,
    pub name: String,
    pub players: Vec<RawPlayerRecord>,
    #[serde(default)]
    pub coaching: CoachingSettings,
    #[serde(default)]
    pub chemistry: Option<f64>,
}

impl TeamData {
    pub fn into_setup(self) -> Result<TeamSetup, SimError> {
        let players = self
            .players
            .into_iter()
            .map(RawPlayerRecord::into_snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        let mut team = TeamSetup::new(self.id, self.name, players);
        team.coaching = self.coaching;
        if let Some(chemistry) = self.chemistry {
            team.chemistry = chemistry.clamp(0.0, 100.0);
        }
        Ok(team)
    }
}

/// Whole game in one call.
#[derive(Debug, Clone, Deserialize)]
pub struct GameRequest {
    pub schema_version: u8,
    pub seed: u64,
    pub home_team: TeamData,
    pub away_team: TeamData,
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

/// One period. A new game needs `seed` and both teams; a continuing game
/// sends back the `state` from the previous response.
#[derive(Debug, Clone, Deserialize)]
pub struct QuarterRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub home_team: Option<TeamData>,
    #[serde(default)]
    pub away_team: Option<TeamData>,
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    #[serde(default)]
    pub home_adjustments: Option<GameAdjustments>,
    #[serde(default)]
    pub away_adjustments: Option<GameAdjustments>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    pub schema_version: u8,
    pub score_home: u32,
    pub score_away: u32,
    pub quarter_scores: TeamPair<Vec<u32>>,
    pub overtime_periods: u8,
    pub possessions: u32,
    pub box_score: TeamPair<Vec<WireBoxScoreLine>>,
    pub team_totals: TeamPair<TeamTotals>,
    pub play_by_play: Vec<PlayByPlayEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<PossessionAnimation>,
    pub synergy_counts: TeamPair<BTreeMap<String, u32>>,
    pub clutch_plays: Vec<ClutchPlay>,
    pub game_winner: Option<ClutchPlay>,
    pub player_deltas: Vec<PlayerGameDelta>,
    pub degraded: DegradedReport,
    pub state: GameState,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterResponse {
    pub schema_version: u8,
    /// The period just played (5 = first overtime).
    pub quarter: u8,
    pub finished: bool,
    pub score_home: u32,
    pub score_away: u32,
    pub period_score: TeamPair<u32>,
    pub quarter_scores: TeamPair<Vec<u32>>,
    pub overtime_periods: u8,
    pub box_score: TeamPair<Vec<WireBoxScoreLine>>,
    pub play_by_play: Vec<PlayByPlayEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<PossessionAnimation>,
    pub synergy_counts: TeamPair<BTreeMap<String, u32>>,
    /// Set once the game is over.
    pub game_winner: Option<ClutchPlay>,
    pub player_deltas: Vec<PlayerGameDelta>,
    pub degraded: DegradedReport,
    pub state: GameState,
}

fn check_schema(version: u8) -> Result<(), String> {
    if version != API_SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", version));
    }
    Ok(())
}

// ============================================================================
// Entry points
// ============================================================================

/// Simulates a full game from a JSON [`GameRequest`].
pub fn simulate_game_json(request_json: &str) -> Result<String, String> {
    let request: GameRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    check_schema(request.schema_version)?;

    let home = request.home_team.into_setup().map_err(|e| format!("Home team: {}", e))?;
    let away = request.away_team.into_setup().map_err(|e| format!("Away team: {}", e))?;
    let config = request.config.unwrap_or_default();
    config.validate().map_err(|e| e.to_string())?;

    let mut engine =
        GameEngine::with_config(home, away, request.seed, config).map_err(|e| format!("Game setup failed: {}", e))?;
    let report = engine.simulate_game().map_err(|e| e.to_string())?;
    let state = engine.snapshot_state();

    let response = GameResponse {
        schema_version: API_SCHEMA_VERSION,
        score_home: report.final_score.home,
        score_away: report.final_score.away,
        quarter_scores: report.quarter_scores,
        overtime_periods: report.overtime_periods,
        possessions: report.possessions,
        box_score: TeamPair::new(report.box_scores.home.to_wire(), report.box_scores.away.to_wire()),
        team_totals: TeamPair::new(report.box_scores.home.totals(), report.box_scores.away.totals()),
        play_by_play: report.play_by_play,
        animations: report.animations,
        synergy_counts: report.synergy_counts,
        clutch_plays: report.clutch_plays,
        game_winner: report.game_winner,
        player_deltas: report.deltas,
        degraded: report.degraded,
        state,
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}

/// Simulates one period from a JSON [`QuarterRequest`], starting a new game
/// or continuing the one in `state`.
pub fn simulate_quarter_json(request_json: &str) -> Result<String, String> {
    let request: QuarterRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    check_schema(request.schema_version)?;
    let config = request.config.unwrap_or_default();
    config.validate().map_err(|e| e.to_string())?;

    let mut engine = match (request.state, request.seed, request.home_team, request.away_team) {
        (Some(value), _, _, _) => {
            let saved = state::from_value(value).map_err(|e| format!("Invalid game state: {}", e))?;
            GameEngine::from_state(saved, config).map_err(|e| format!("Cannot resume game: {}", e))?
        }
        (None, Some(seed), Some(home), Some(away)) => {
            let home = home.into_setup().map_err(|e| format!("Home team: {}", e))?;
            let away = away.into_setup().map_err(|e| format!("Away team: {}", e))?;
            GameEngine::with_config(home, away, seed, config).map_err(|e| format!("Game setup failed: {}", e))?
        }
        _ => return Err("Request needs either a state or a seed with both teams".to_string()),
    };

    for (side, adjustments) in [(TeamSide::Home, request.home_adjustments), (TeamSide::Away, request.away_adjustments)] {
        if let Some(adjustments) = adjustments.filter(|a| !a.is_empty()) {
            engine
                .apply_adjustments(side, &adjustments)
                .map_err(|e| format!("Invalid {:?} adjustments: {}", side, e))?;
        }
    }

    let quarter = engine.simulate_quarter().map_err(|e| e.to_string())?;
    let finished = quarter.period.finished;
    let game_winner = if finished { engine.report().game_winner } else { None };
    let state = engine.snapshot_state();

    let response = QuarterResponse {
        schema_version: API_SCHEMA_VERSION,
        quarter: quarter.period.quarter,
        finished,
        score_home: quarter.period.scores.home,
        score_away: quarter.period.scores.away,
        period_score: quarter.period.period_score,
        quarter_scores: state.quarter_scores.clone(),
        overtime_periods: state.overtime_periods(&engine.config().clock),
        box_score: TeamPair::new(state.box_scores.home.to_wire(), state.box_scores.away.to_wire()),
        play_by_play: quarter.play_by_play,
        animations: quarter.animations,
        synergy_counts: state.synergy_counts.clone(),
        game_winner,
        player_deltas: engine.game_deltas(),
        degraded: state.degraded,
        state,
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}
