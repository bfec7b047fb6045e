//! Possession simulation
//!
//! One possession for one team: minutes accrue to both fives, a play is
//! selected and executed, and the [`PlayResult`] is written into the box
//! scores, the scoreboard and the per-game tallies held in [`GameState`].
//!
//! Stat credit that the play itself does not decide (assists, steals on
//! loose-ball turnovers, blocks, rebounds) is drawn here from the ratings of
//! the players on the floor.

use rand::Rng;

use super::attributes;
use super::config::EngineConfig;
use super::lineup::lineup_players;
use super::play_executor::{PlayContext, PlayExecutor, PlayInput, PlayOutcome, PlayResult};
use super::play_selector::{PlaySelector, SelectionContext};
use super::probability;
use crate::models::{
    attr, format_clock, BoxScore, ClutchPlay, PlayByPlayEntry, PlayerId, PlayerSnapshot,
    PossessionAnimation, TeamPair, TeamSetup, TeamSide,
};
use crate::state::GameState;

/// Everything one possession produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PossessionOutcome {
    /// The offense keeps the ball.
    pub offensive_rebound: bool,
    /// Keyframes are moved into `animation` when it is recorded.
    pub result: PlayResult,
    pub entry: PlayByPlayEntry,
    pub animation: Option<PossessionAnimation>,
    pub clutch: Option<ClutchPlay>,
}

/// Stat credit decided after the play.
#[derive(Debug, Clone, Default, PartialEq)]
struct Credits {
    assist: Option<PlayerId>,
    steal: Option<PlayerId>,
    block: Option<PlayerId>,
    rebound: Option<(PlayerId, bool)>,
}

/// Simulates one possession for `side` lasting `duration_minutes`.
///
/// The clock is not advanced; the quarter loop does that with the same
/// duration once this returns.
pub fn simulate_possession<S, R>(
    state: &mut GameState,
    side: TeamSide,
    duration_minutes: f64,
    selector: &S,
    config: &EngineConfig,
    ctx: &mut PlayContext,
    rng: &mut R,
) -> PossessionOutcome
where
    S: PlaySelector + ?Sized,
    R: Rng,
{
    let clock = format_clock(state.clock_minutes);
    accrue_minutes(state, duration_minutes);

    let offense_team = state.teams.get(side);
    let defense_team = state.teams.get(side.opponent());
    let offense = lineup_players(offense_team, state.lineups.get(side));
    let defense = lineup_players(defense_team, state.lineups.get(side.opponent()));

    let scheme = offense_team.coaching.offensive_scheme;
    let defensive_scheme = defense_team.coaching.defensive_scheme;
    let selection = SelectionContext {
        is_transition: rng.gen::<f64>() < scheme.transition_frequency(),
        shot_clock_seconds: (state.clock_minutes * 60.0).min(config.clock.max_possession_seconds),
        score_differential: state.score_differential(side),
        quarter: state.quarter,
        time_remaining: state.clock_minutes,
        defensive_scheme,
    };

    let play = selector.select_play(&offense, &defense, scheme, &selection, &mut *rng);
    let synergies = attributes::active_synergies(&offense);
    let input = PlayInput {
        offense: &offense,
        defense: &defense,
        defensive_scheme,
        modifiers: defense_team.coaching.effective_defensive_modifiers(),
        synergies: &synergies,
    };
    let mut result = PlayExecutor::new(config).execute_play(play, &input, ctx, rng);

    let credits = draw_credits(&result, offense_team, defense_team, &offense, &defense, config, rng);

    // Reads are done; everything below writes.
    apply_to_box_scores(&mut state.box_scores, side, &result, &credits);

    let points = u32::from(result.points);
    let lead_before = state.score_differential(side);
    *state.scores.get_mut(side) += points;
    let period = usize::from(state.quarter.max(1)) - 1;
    for quarters in [&mut state.quarter_scores.home, &mut state.quarter_scores.away] {
        if quarters.len() <= period {
            quarters.resize(period + 1, 0);
        }
    }
    state.quarter_scores.get_mut(side)[period] += points;

    for synergy in &result.synergies {
        *state.synergy_counts.get_mut(side).entry(synergy.synergy.clone()).or_insert(0) += 1;
    }
    state.degraded.absorb(result.degraded);

    state.possession_count += 1;
    if state.quarter_possessions.len() <= period {
        state.quarter_possessions.resize(period + 1, 0);
    }
    state.quarter_possessions[period] += 1;

    let remaining_after = (state.clock_minutes - duration_minutes).max(0.0);
    let clutch = clutch_play(state, side, &result, lead_before, remaining_after, &clock, config);
    if let Some(play) = &clutch {
        tracing::debug!(player = %play.player_id, quarter = play.quarter, clock = %play.clock, "clutch basket");
        state.clutch_plays.push(play.clone());
    }

    let team = state.team_name(side).to_string();
    let entry = PlayByPlayEntry {
        possession: state.possession_count,
        quarter: state.quarter,
        clock: clock.clone(),
        team: team.clone(),
        play: result.play.clone(),
        outcome: result.outcome.to_string(),
        points: result.points,
        description: result.description.clone(),
        score_home: state.scores.home,
        score_away: state.scores.away,
    };

    let animation = config.record_animation.then(|| PossessionAnimation {
        possession: state.possession_count,
        quarter: state.quarter,
        clock,
        team,
        play: result.play.clone(),
        keyframes: std::mem::take(&mut result.keyframes),
        badges: result.badges.clone(),
        synergies: result.synergies.clone(),
        box_score: config
            .record_box_snapshots
            .then(|| TeamPair::new(state.box_scores.home.to_wire(), state.box_scores.away.to_wire())),
    });

    PossessionOutcome {
        offensive_rebound: result.kept_possession(),
        result,
        entry,
        animation,
        clutch,
    }
}

fn accrue_minutes(state: &mut GameState, minutes: f64) {
    for side in TeamSide::BOTH {
        let team = state.teams.get(side);
        let box_score = state.box_scores.get_mut(side);
        for id in state.lineups.get(side) {
            if let Some(player) = team.player(id) {
                box_score.ensure_line(player);
            }
            if let Some(line) = box_score.line_mut(id) {
                line.minutes += minutes;
            }
        }
    }
}

// ============================================================================
// Credit
// ============================================================================

fn draw_credits<R: Rng + ?Sized>(
    result: &PlayResult,
    offense_team: &TeamSetup,
    defense_team: &TeamSetup,
    offense: &[&PlayerSnapshot],
    defense: &[&PlayerSnapshot],
    config: &EngineConfig,
    rng: &mut R,
) -> Credits {
    let credit = &config.credit;
    let mut credits = Credits::default();

    if result.outcome == PlayOutcome::Made {
        if let Some(shot) = &result.shot {
            let rate = credit.chemistry_rate(credit.base_assist_rate, offense_team.chemistry);
            if rng.gen::<f64>() < rate {
                credits.assist = assister(result, &shot.shooter, offense, rng);
            }
        }
    }

    if let Some(shot) = result.shot.as_ref().filter(|s| s.blocked) {
        credits.block = probability::weighted_pick(defense, |p| p.attribute(attr::BLOCK), rng)
            .map(|p| p.id.clone())
            .or_else(|| Some(shot.defender.clone()));
    }

    if let Some(turnover) = &result.turnover {
        credits.steal = match &turnover.stolen_by {
            Some(id) => Some(id.clone()),
            None => {
                let rate = credit.chemistry_rate(credit.base_steal_credit, defense_team.chemistry);
                if rng.gen::<f64>() < rate {
                    probability::weighted_pick(defense, |p| p.attribute(attr::STEAL), rng).map(|p| p.id.clone())
                } else {
                    None
                }
            }
        };
    }

    if let Some(offensive) = result.offensive_rebound {
        let (pool, attribute) =
            if offensive { (offense, attr::OFFENSIVE_REBOUND) } else { (defense, attr::DEFENSIVE_REBOUND) };
        credits.rebound = probability::weighted_pick(
            pool,
            |p| p.position.rebound_multiplier() * p.attribute(attribute),
            rng,
        )
        .map(|p| (p.id.clone(), offensive));
    }

    credits
}

/// The last passer when there was one, otherwise a random teammate.
fn assister<R: Rng + ?Sized>(
    result: &PlayResult,
    shooter: &str,
    offense: &[&PlayerSnapshot],
    rng: &mut R,
) -> Option<PlayerId> {
    let passer = result
        .last_passer
        .as_deref()
        .filter(|id| *id != shooter && offense.iter().any(|p| p.id == *id));
    if let Some(id) = passer {
        return Some(id.to_string());
    }
    let teammates: Vec<&&PlayerSnapshot> = offense.iter().filter(|p| p.id != shooter).collect();
    if teammates.is_empty() {
        return None;
    }
    Some(teammates[rng.gen_range(0..teammates.len())].id.clone())
}

fn apply_to_box_scores(box_scores: &mut TeamPair<BoxScore>, side: TeamSide, result: &PlayResult, credits: &Credits) {
    let (offense, defense) = box_scores.split_mut(side);

    if let Some(shot) = &result.shot {
        if let Some(line) = offense.line_mut(&shot.shooter) {
            line.record_field_goal(shot.points, shot.made);
        }
    }
    if let Some(ft) = &result.free_throws {
        if let Some(line) = offense.line_mut(&ft.shooter) {
            line.record_free_throws(ft.made, ft.attempted);
        }
        if let Some(line) = defense.line_mut(&ft.fouled_by) {
            line.fouls += 1;
        }
    }
    if let Some(turnover) = &result.turnover {
        if let Some(line) = offense.line_mut(&turnover.player) {
            line.turnovers += 1;
        }
    }

    if let Some(line) = credits.assist.as_deref().and_then(|id| offense.line_mut(id)) {
        line.assists += 1;
    }
    if let Some(line) = credits.steal.as_deref().and_then(|id| defense.line_mut(id)) {
        line.steals += 1;
    }
    if let Some(line) = credits.block.as_deref().and_then(|id| defense.line_mut(id)) {
        line.blocks += 1;
    }
    match &credits.rebound {
        Some((id, true)) => {
            if let Some(line) = offense.line_mut(id) {
                line.offensive_rebounds += 1;
            }
        }
        Some((id, false)) => {
            if let Some(line) = defense.line_mut(id) {
                line.defensive_rebounds += 1;
            }
        }
        None => {}
    }
}

/// A late made basket that ties or takes the lead and leaves a one-score game.
fn clutch_play(
    state: &GameState,
    side: TeamSide,
    result: &PlayResult,
    lead_before: i32,
    remaining: f64,
    clock: &str,
    config: &EngineConfig,
) -> Option<ClutchPlay> {
    if result.outcome != PlayOutcome::Made || result.points == 0 {
        return None;
    }
    if state.quarter < config.clock.regulation_quarters || remaining > config.credit.clutch_minutes {
        return None;
    }
    let lead_after = state.score_differential(side);
    if lead_before > 0 || lead_after < 0 || lead_after.unsigned_abs() > config.credit.clutch_margin {
        return None;
    }
    let shooter = result.shot.as_ref()?;
    Some(ClutchPlay {
        possession: state.possession_count,
        quarter: state.quarter,
        clock: clock.to_string(),
        side,
        player_id: shooter.shooter.clone(),
        points: result.points,
        score_home: state.scores.home,
        score_away: state.scores.away,
        description: result.description.clone(),
    })
}
