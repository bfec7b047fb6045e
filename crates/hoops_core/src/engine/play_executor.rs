//! Play execution engine
//!
//! Walks a [`Play`]'s action graph against two lineups. Every action resolves
//! its actor and a matched defender, samples an outcome from the modified
//! probability table and records a keyframe; terminal outcomes are turned
//! into a [`PlayResult`]. Box scores and the scoreboard are left to the
//! possession simulator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::attributes::{self, ActiveSynergy};
use super::config::EngineConfig;
use super::probability::{self, OutcomeAdjustments, OutcomeBias};
use super::roles::{self, RoleAssignment};
use crate::models::{
    attr, Action, ActionKind, BadgeActivation, CourtPoint, DefensiveModifiers, DefensiveScheme,
    DegradedReport, Keyframe, NextStep, Play, PlayerId, PlayerSnapshot, SynergyActivation,
};

// ============================================================================
// Context & results
// ============================================================================

/// Per-play scratch state. Owned by the caller and reset at the start of
/// every [`PlayExecutor::execute_play`] call.
#[derive(Debug, Clone, Default)]
pub struct PlayContext {
    pub roles: RoleAssignment,
    pub offense_spots: BTreeMap<PlayerId, CourtPoint>,
    pub defense_spots: BTreeMap<PlayerId, CourtPoint>,
    pub ball_carrier: Option<PlayerId>,
    pub last_passer: Option<PlayerId>,
    pub keyframes: Vec<Keyframe>,
    /// Seconds since the play started.
    pub elapsed: f64,
    pub badges: Vec<BadgeActivation>,
    pub synergies: Vec<SynergyActivation>,
    pub last_description: String,
}

impl PlayContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.roles.clear();
        self.offense_spots.clear();
        self.defense_spots.clear();
        self.ball_carrier = None;
        self.last_passer = None;
        self.keyframes.clear();
        self.elapsed = 0.0;
        self.badges.clear();
        self.synergies.clear();
        self.last_description.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayOutcome {
    Made,
    Missed,
    Turnover,
    FreeThrows,
    Completed,
}

impl fmt::Display for PlayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlayOutcome::Made => "made",
            PlayOutcome::Missed => "missed",
            PlayOutcome::Turnover => "turnover",
            PlayOutcome::FreeThrows => "free_throws",
            PlayOutcome::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A field-goal attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotSummary {
    pub shooter: PlayerId,
    /// Value of the attempt (2 or 3).
    pub points: u8,
    pub made: bool,
    pub blocked: bool,
    pub defender: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverSummary {
    pub player: PlayerId,
    /// Set when the outcome itself was a steal.
    pub stolen_by: Option<PlayerId>,
    pub matched_defender: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeThrowSummary {
    pub shooter: PlayerId,
    pub made: u8,
    pub attempted: u8,
    pub fouled_by: PlayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayResult {
    pub play: String,
    pub outcome: PlayOutcome,
    /// Key of the last sampled outcome.
    pub outcome_key: String,
    pub points: u8,
    pub shot: Option<ShotSummary>,
    pub last_passer: Option<PlayerId>,
    pub turnover: Option<TurnoverSummary>,
    pub free_throws: Option<FreeThrowSummary>,
    /// `Some` when the play ended in a rebound battle; `true` if the
    /// offense won it.
    pub offensive_rebound: Option<bool>,
    pub description: String,
    pub keyframes: Vec<Keyframe>,
    pub badges: Vec<BadgeActivation>,
    pub synergies: Vec<SynergyActivation>,
    /// Seconds of game time the play used.
    pub elapsed: f64,
    pub degraded: DegradedReport,
}

impl PlayResult {
    pub fn kept_possession(&self) -> bool {
        self.offensive_rebound.unwrap_or(false)
    }
}

/// Lineups and coaching inputs for one play.
#[derive(Debug, Clone, Copy)]
pub struct PlayInput<'a> {
    pub offense: &'a [&'a PlayerSnapshot],
    pub defense: &'a [&'a PlayerSnapshot],
    pub defensive_scheme: DefensiveScheme,
    pub modifiers: DefensiveModifiers,
    /// Synergies open to the offensive five.
    pub synergies: &'a [ActiveSynergy],
}

// ============================================================================
// Executor
// ============================================================================

enum Finish<'p> {
    Terminal {
        next: NextStep,
        key: String,
        points: Option<u8>,
        kind: ActionKind,
        actor: &'p PlayerSnapshot,
        defender: &'p PlayerSnapshot,
    },
    Truncated { key: String },
}

pub struct PlayExecutor<'c> {
    config: &'c EngineConfig,
}

fn find<'p>(lineup: &[&'p PlayerSnapshot], id: &str) -> Option<&'p PlayerSnapshot> {
    lineup.iter().copied().find(|p| p.id == id)
}

impl<'c> PlayExecutor<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Runs `play` to a terminal outcome, the step cap or an unresolved
    /// pointer, whichever comes first.
    pub fn execute_play<R: Rng + ?Sized>(
        &self,
        play: &Play,
        input: &PlayInput<'_>,
        ctx: &mut PlayContext,
        rng: &mut R,
    ) -> PlayResult {
        ctx.reset();
        let cfg = &self.config.probability;
        let mut degraded = DegradedReport::default();

        let offense_placeholder = PlayerSnapshot::placeholder();
        let defense_placeholder = PlayerSnapshot::placeholder();
        let offense: Vec<&PlayerSnapshot> = if input.offense.is_empty() {
            tracing::warn!(play = %play.name, "empty offensive lineup; using placeholder");
            degraded.placeholder_players += 1;
            vec![&offense_placeholder]
        } else {
            input.offense.to_vec()
        };
        let defense: Vec<&PlayerSnapshot> = if input.defense.is_empty() {
            tracing::warn!(play = %play.name, "empty defensive lineup; using placeholder");
            degraded.placeholder_players += 1;
            vec![&defense_placeholder]
        } else {
            input.defense.to_vec()
        };

        roles::assign_roles(&play.roles(), &offense, cfg, &mut ctx.roles, rng);
        self.place_players(&offense, &defense, ctx);

        let Some(entry) = play.entry() else {
            degraded.truncated_plays += 1;
            tracing::warn!(play = %play.name, "play has no actions");
            return self.truncated_result(play, String::new(), None, ctx, degraded);
        };
        let first_actor = self.actor_for(entry, &offense, ctx).unwrap_or(&offense_placeholder);
        ctx.ball_carrier = Some(first_actor.id.clone());

        let mut action = entry;
        let mut steps = 0usize;
        let mut shot: Option<ShotSummary> = None;

        let finish = loop {
            if steps >= cfg.max_play_steps {
                tracing::warn!(play = %play.name, steps, "step cap reached; play stopped");
                break Finish::Truncated { key: String::new() };
            }
            steps += 1;

            let actor = self.actor_for(action, &offense, ctx).unwrap_or(&offense_placeholder);
            let defender = match_defender(actor, action.kind, &defense, input.defensive_scheme)
                .unwrap_or(&defense_placeholder);
            let receiver = action
                .receiver
                .as_deref()
                .and_then(|role| ctx.roles.get(role))
                .and_then(|id| find(&offense, id));

            self.apply_movement(action, actor, defender, ctx);

            // Matchup
            let mut activations = attributes::activated_badges(actor, action.kind, false);
            activations.extend(attributes::activated_badges(defender, action.kind, true));

            let mut synergy_bonus = 0.0;
            if action.kind.is_shot() {
                for synergy in input.synergies.iter().filter(|s| s.player == actor.id) {
                    synergy_bonus += synergy.bonus;
                    ctx.synergies.push(synergy.activation());
                }
            }

            let adj = OutcomeAdjustments {
                offense_rating: attributes::offense_rating(actor, action.kind, &action.offense_weights, cfg),
                defense_rating: attributes::defense_rating(defender, action.kind, &action.defense_weights, cfg),
                badge_boost: attributes::badge_boost(&activations),
                scheme: input.modifiers,
                synergy_bonus,
            };
            let table = probability::modify_outcome_probabilities(&action.outcomes, &adj, cfg);
            ctx.badges.extend(activations);

            let sampled = probability::sample_outcome(&table, rng)
                .and_then(|key| action.outcomes.get(key).map(|o| (key.to_string(), o)));
            let Some((key, outcome)) = sampled else {
                tracing::warn!(play = %play.name, action = %action.id, "action has no outcomes");
                break Finish::Truncated { key: String::new() };
            };

            // Side effects
            if action.kind.is_shot() && outcome.next != NextStep::FreeThrows {
                shot = Some(ShotSummary {
                    shooter: actor.id.clone(),
                    points: action.kind.shot_points(),
                    made: outcome.next == NextStep::EndMade,
                    blocked: probability::is_blocked_key(&key),
                    defender: defender.id.clone(),
                });
            }
            // Off-ball actions leave the ball where it is.
            if !matches!(action.kind, ActionKind::Screen | ActionKind::Cut) {
                ctx.ball_carrier = Some(actor.id.clone());
            }
            let defense_won = probability::classify_outcome(&key) == OutcomeBias::Defense;
            if action.kind.transfers_ball() && !defense_won && outcome.next != NextStep::EndTurnover {
                if let Some(receiver) = receiver {
                    ctx.last_passer = Some(actor.id.clone());
                    ctx.ball_carrier = Some(receiver.id.clone());
                }
            }

            let description = describe(action, actor, receiver);
            self.record_keyframe(action, &key, &description, ctx);
            ctx.last_description = description;
            ctx.elapsed += action.duration;

            match &outcome.next {
                NextStep::Action(id) => match play.action(id) {
                    Some(next) => action = next,
                    None => {
                        if action.kind.is_shot() && probability::is_made_key(&key) {
                            if let Some(shot) = shot.as_mut() {
                                shot.made = true;
                            }
                        }
                        tracing::warn!(play = %play.name, pointer = %id, "unresolved action pointer; play stopped");
                        break Finish::Truncated { key };
                    }
                },
                terminal => {
                    break Finish::Terminal {
                        next: terminal.clone(),
                        key,
                        points: outcome.points,
                        kind: action.kind,
                        actor,
                        defender,
                    }
                }
            }
        };

        match finish {
            Finish::Truncated { key } => {
                degraded.truncated_plays += 1;
                self.truncated_result(play, key, shot, ctx, degraded)
            }
            Finish::Terminal { next, key, points, kind, actor, defender } => {
                let mut result = PlayResult {
                    play: play.name.clone(),
                    outcome: PlayOutcome::Completed,
                    outcome_key: key.clone(),
                    points: 0,
                    shot,
                    last_passer: ctx.last_passer.clone(),
                    turnover: None,
                    free_throws: None,
                    offensive_rebound: None,
                    description: ctx.last_description.clone(),
                    keyframes: Vec::new(),
                    badges: Vec::new(),
                    synergies: Vec::new(),
                    elapsed: ctx.elapsed,
                    degraded,
                };
                self.finish_terminal(&mut result, next, points, kind, actor, defender, &offense, &defense, rng);
                result.keyframes = std::mem::take(&mut ctx.keyframes);
                result.badges = std::mem::take(&mut ctx.badges);
                result.synergies = std::mem::take(&mut ctx.synergies);
                result
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_terminal<R: Rng + ?Sized>(
        &self,
        result: &mut PlayResult,
        next: NextStep,
        points: Option<u8>,
        kind: ActionKind,
        actor: &PlayerSnapshot,
        defender: &PlayerSnapshot,
        offense: &[&PlayerSnapshot],
        defense: &[&PlayerSnapshot],
        rng: &mut R,
    ) {
        let made_points = |points: Option<u8>| {
            points.unwrap_or(if kind.is_shot() { kind.shot_points() } else { 2 })
        };

        match next {
            NextStep::EndMade => {
                let value = made_points(points);
                result.outcome = PlayOutcome::Made;
                result.points = value;
                self.ensure_made_shot(result, actor, defender, value);
            }
            NextStep::EndTurnover => {
                result.outcome = PlayOutcome::Turnover;
                result.turnover = Some(TurnoverSummary {
                    player: actor.id.clone(),
                    stolen_by: probability::is_stolen_key(&result.outcome_key).then(|| defender.id.clone()),
                    matched_defender: defender.id.clone(),
                });
            }
            NextStep::Completed(_) => match points.filter(|p| *p > 0) {
                // A scoring end marker counts as a made basket by the actor.
                Some(value) => {
                    result.outcome = PlayOutcome::Made;
                    result.points = value;
                    self.ensure_made_shot(result, actor, defender, value);
                }
                None => result.outcome = PlayOutcome::Completed,
            },
            NextStep::ReboundBattle => {
                result.outcome = PlayOutcome::Missed;
                result.offensive_rebound = Some(self.rebound_battle(offense, defense, rng));
            }
            NextStep::FreeThrows => {
                let cfg = &self.config.probability;
                let rating = attributes::condition_adjusted(actor.attribute(attr::FREE_THROW), actor, cfg);
                let chance = probability::free_throw_chance(rating, cfg);
                let mut made = 0u8;
                let mut last_made = false;
                for _ in 0..2 {
                    last_made = rng.gen::<f64>() < chance;
                    if last_made {
                        made += 1;
                    }
                }
                result.outcome = PlayOutcome::FreeThrows;
                result.points = made;
                result.free_throws = Some(FreeThrowSummary {
                    shooter: actor.id.clone(),
                    made,
                    attempted: 2,
                    fouled_by: defender.id.clone(),
                });
                if !last_made {
                    result.offensive_rebound = Some(self.rebound_battle(offense, defense, rng));
                }
            }
            NextStep::Action(_) => result.outcome = PlayOutcome::Completed,
        }
    }

    fn ensure_made_shot(&self, result: &mut PlayResult, actor: &PlayerSnapshot, defender: &PlayerSnapshot, value: u8) {
        match result.shot.as_mut() {
            Some(shot) => {
                shot.made = true;
                shot.blocked = false;
                shot.points = value;
            }
            None => {
                result.shot = Some(ShotSummary {
                    shooter: actor.id.clone(),
                    points: value,
                    made: true,
                    blocked: false,
                    defender: defender.id.clone(),
                })
            }
        }
    }

    /// Team-level coin flip using the clamped offensive rebound chance.
    fn rebound_battle<R: Rng + ?Sized>(
        &self,
        offense: &[&PlayerSnapshot],
        defense: &[&PlayerSnapshot],
        rng: &mut R,
    ) -> bool {
        let chance = probability::offensive_rebound_chance(
            rebounding_strength(offense, attr::OFFENSIVE_REBOUND),
            rebounding_strength(defense, attr::DEFENSIVE_REBOUND),
            &self.config.rebound,
        );
        rng.gen::<f64>() < chance
    }

    /// A stopped play keeps its last outcome, including a shot already taken.
    fn truncated_result(
        &self,
        play: &Play,
        key: String,
        shot: Option<ShotSummary>,
        ctx: &mut PlayContext,
        degraded: DegradedReport,
    ) -> PlayResult {
        let (outcome, points) = match &shot {
            Some(s) if s.made => (PlayOutcome::Made, s.points),
            Some(_) => (PlayOutcome::Missed, 0),
            None => (PlayOutcome::Completed, 0),
        };
        PlayResult {
            play: play.name.clone(),
            outcome,
            outcome_key: key,
            points,
            shot,
            last_passer: ctx.last_passer.clone(),
            turnover: None,
            free_throws: None,
            offensive_rebound: None,
            description: ctx.last_description.clone(),
            keyframes: std::mem::take(&mut ctx.keyframes),
            badges: std::mem::take(&mut ctx.badges),
            synergies: std::mem::take(&mut ctx.synergies),
            elapsed: ctx.elapsed,
            degraded,
        }
    }

    fn actor_for<'p>(
        &self,
        action: &Action,
        offense: &[&'p PlayerSnapshot],
        ctx: &PlayContext,
    ) -> Option<&'p PlayerSnapshot> {
        ctx.roles
            .get(&action.actor)
            .and_then(|id| find(offense, id))
            .or_else(|| ctx.ball_carrier.as_deref().and_then(|id| find(offense, id)))
            .or_else(|| offense.first().copied())
    }

    fn place_players(&self, offense: &[&PlayerSnapshot], defense: &[&PlayerSnapshot], ctx: &mut PlayContext) {
        for player in offense {
            let (x, y) = player.position.court_spot();
            ctx.offense_spots.insert(player.id.clone(), CourtPoint::new(x, y));
        }
        for player in defense {
            let (x, y) = player.position.court_spot();
            ctx.defense_spots.insert(player.id.clone(), CourtPoint::new(x, y).guarded());
        }
    }

    fn apply_movement(
        &self,
        action: &Action,
        actor: &PlayerSnapshot,
        defender: &PlayerSnapshot,
        ctx: &mut PlayContext,
    ) {
        let (dx, dy) = match (action.movement, action.kind) {
            (Some(m), _) => (m.dx, m.dy),
            (None, ActionKind::Drive) | (None, ActionKind::Paint) => (0.0, -10.0),
            (None, ActionKind::Cut) => (0.0, -8.0),
            (None, ActionKind::PostUp) => (0.0, -4.0),
            (None, _) => return,
        };
        let from = ctx.offense_spots.get(&actor.id).copied().unwrap_or_default();
        let to = from.shifted(dx, dy);
        ctx.offense_spots.insert(actor.id.clone(), to);
        ctx.defense_spots.insert(defender.id.clone(), to.guarded());
    }

    fn record_keyframe(&self, action: &Action, key: &str, description: &str, ctx: &mut PlayContext) {
        if !self.config.record_animation {
            return;
        }
        ctx.keyframes.push(Keyframe {
            time: ctx.elapsed + action.duration,
            offense: ctx.offense_spots.clone(),
            defense: ctx.defense_spots.clone(),
            ball_carrier: ctx.ball_carrier.clone(),
            description: description.to_string(),
            annotation: annotation(action.kind, key),
        });
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Σ position multiplier × rebounding attribute.
pub fn rebounding_strength(lineup: &[&PlayerSnapshot], attribute: &str) -> f64 {
    lineup
        .iter()
        .map(|p| p.position.rebound_multiplier() * p.attribute(attribute))
        .sum()
}

/// Defender for an action. Zones send paint and post touches to the best
/// interior defender; otherwise the defender at the actor's position, then
/// anyone who can play it, then the first defender.
pub fn match_defender<'p>(
    actor: &PlayerSnapshot,
    kind: ActionKind,
    defense: &[&'p PlayerSnapshot],
    scheme: DefensiveScheme,
) -> Option<&'p PlayerSnapshot> {
    let zone = matches!(scheme, DefensiveScheme::Zone23 | DefensiveScheme::Zone32);
    if zone && matches!(kind, ActionKind::Paint | ActionKind::PostUp) {
        let anchor = defense.iter().copied().max_by(|a, b| {
            a.attribute(attr::INTERIOR_DEFENSE).total_cmp(&b.attribute(attr::INTERIOR_DEFENSE))
        });
        if anchor.is_some() {
            return anchor;
        }
    }

    defense
        .iter()
        .copied()
        .find(|d| d.position == actor.position)
        .or_else(|| defense.iter().copied().find(|d| d.can_play(actor.position)))
        .or_else(|| defense.first().copied())
}

fn describe(action: &Action, actor: &PlayerSnapshot, receiver: Option<&PlayerSnapshot>) -> String {
    match &action.description {
        Some(template) => template
            .replace("{actor}", &actor.name)
            .replace("{receiver}", receiver.map(|r| r.name.as_str()).unwrap_or("a teammate")),
        None => match receiver {
            Some(r) if action.kind.transfers_ball() => {
                format!("{} {} to {}", actor.name, action.kind.verb(), r.name)
            }
            _ => format!("{} {}", actor.name, action.kind.verb()),
        },
    }
}

fn annotation(kind: ActionKind, key: &str) -> Option<String> {
    if probability::is_blocked_key(key) {
        Some("blocked".to_string())
    } else if probability::is_stolen_key(key) {
        Some("stolen".to_string())
    } else if key.contains("turnover") {
        Some("turnover".to_string())
    } else if kind.is_shot() && probability::is_made_key(key) {
        Some("made".to_string())
    } else if kind.is_shot() && key.contains("miss") {
        Some("missed".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeTier, Outcome, Position};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn five(prefix: &str, rating: u8) -> Vec<PlayerSnapshot> {
        Position::ALL
            .iter()
            .map(|pos| PlayerSnapshot::new(format!("{}_{}", prefix, pos), format!("{} {}", prefix, pos), *pos, rating))
            .collect()
    }

    fn pass_then_three() -> Play {
        Play::new(
            "kick_out",
            vec![
                Action::new("entry", ActionKind::Pass, "ballHandler")
                    .receiver("shooter")
                    .outcome("success", Outcome::new(0.9, "shot"))
                    .outcome("stolen", Outcome::new(0.1, "end_turnover")),
                Action::new("shot", ActionKind::ThreePoint, "shooter")
                    .outcome("made", Outcome::new(0.4, "end_made").with_points(3))
                    .outcome("missed", Outcome::new(0.6, "rebound_battle")),
            ],
        )
    }

    fn input<'a>(
        offense: &'a [&'a PlayerSnapshot],
        defense: &'a [&'a PlayerSnapshot],
    ) -> PlayInput<'a> {
        PlayInput {
            offense,
            defense,
            defensive_scheme: DefensiveScheme::Man,
            modifiers: DefensiveModifiers::default(),
            synergies: &[],
        }
    }

    #[test]
    fn test_play_reaches_a_terminal() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 75);
        let away = five("a", 75);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..200 {
            let result = executor.execute_play(&pass_then_three(), &input(&off, &def), &mut ctx, &mut rng);
            assert!(result.degraded.is_clean());
            match result.outcome {
                PlayOutcome::Made => {
                    assert_eq!(result.points, 3);
                    let shot = result.shot.as_ref().unwrap();
                    assert!(shot.made);
                    assert!(result.last_passer.is_some());
                }
                PlayOutcome::Missed => assert!(result.offensive_rebound.is_some()),
                PlayOutcome::Turnover => {
                    let to = result.turnover.as_ref().unwrap();
                    assert!(to.stolen_by.is_some());
                }
                other => panic!("unexpected outcome {}", other),
            }
            assert!(!result.keyframes.is_empty());
        }
    }

    #[test]
    fn test_unresolved_pointer_stops_play() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 70);
        let away = five("a", 70);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let play = Play::new(
            "broken",
            vec![Action::new("entry", ActionKind::Screen, "screener")
                .outcome("set", Outcome::new(1.0, "missing_action"))],
        );
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = executor.execute_play(&play, &input(&off, &def), &mut ctx, &mut rng);
        assert_eq!(result.outcome, PlayOutcome::Completed);
        assert_eq!(result.points, 0);
        assert_eq!(result.degraded.truncated_plays, 1);
        assert_eq!(result.outcome_key, "set");
    }

    #[test]
    fn test_step_cap_on_cycle() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 70);
        let away = five("a", 70);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let play = Play::new(
            "loop",
            vec![Action::new("swing", ActionKind::Pass, "ballHandler")
                .receiver("wing")
                .outcome("success", Outcome::new(1.0, "swing"))],
        );
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = executor.execute_play(&play, &input(&off, &def), &mut ctx, &mut rng);
        assert_eq!(result.degraded.truncated_plays, 1);
        assert_eq!(result.keyframes.len(), 20);
        assert!((result.elapsed - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_shot_before_unresolved_pointer_stands() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 70);
        let away = five("a", 70);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let made = Play::new(
            "and_one",
            vec![Action::new("three", ActionKind::ThreePoint, "shooter")
                .outcome("made", Outcome::new(1.0, "free_throw_bonus"))],
        );
        let result = executor.execute_play(&made, &input(&off, &def), &mut ctx, &mut rng);
        assert_eq!(result.degraded.truncated_plays, 1);
        assert_eq!(result.outcome, PlayOutcome::Made);
        assert_eq!(result.points, 3);
        let shot = result.shot.as_ref().unwrap();
        assert!(shot.made);
        assert_eq!(shot.points, 3);

        let missed = Play::new(
            "long_rebound",
            vec![Action::new("three", ActionKind::ThreePoint, "shooter")
                .outcome("missed", Outcome::new(1.0, "tip_out"))],
        );
        let result = executor.execute_play(&missed, &input(&off, &def), &mut ctx, &mut rng);
        assert_eq!(result.degraded.truncated_plays, 1);
        assert_eq!(result.outcome, PlayOutcome::Missed);
        assert_eq!(result.points, 0);
        assert!(!result.shot.as_ref().unwrap().made);
        assert!(!result.kept_possession());
    }

    #[test]
    fn test_empty_lineup_uses_placeholder() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let away = five("a", 70);
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let result = executor.execute_play(&pass_then_three(), &input(&[], &def), &mut ctx, &mut rng);
        assert_eq!(result.degraded.placeholder_players, 1);
        if let Some(shot) = &result.shot {
            assert_eq!(shot.shooter, crate::models::PLACEHOLDER_PLAYER_ID);
        }
    }

    #[test]
    fn test_free_throws_take_two_attempts() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 70);
        let away = five("a", 70);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let play = Play::new(
            "foul",
            vec![Action::new("drive", ActionKind::Drive, "ballHandler")
                .outcome("fouled", Outcome::new(1.0, "free_throws"))],
        );
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let result = executor.execute_play(&play, &input(&off, &def), &mut ctx, &mut rng);
            let ft = result.free_throws.as_ref().unwrap();
            assert_eq!(ft.attempted, 2);
            assert_eq!(result.points, ft.made);
            assert!(result.shot.is_none());
            if ft.made == 2 {
                assert!(result.offensive_rebound.is_none());
            }
        }
    }

    #[test]
    fn test_defensive_badge_is_recorded() {
        let config = EngineConfig::default();
        let executor = PlayExecutor::new(&config);
        let home = five("h", 70);
        let mut away = five("a", 70);
        away[1] = away[1].clone().with_badge("clamps", BadgeTier::Gold);
        let off: Vec<&PlayerSnapshot> = home.iter().collect();
        let def: Vec<&PlayerSnapshot> = away.iter().collect();
        let play = Play::new(
            "iso",
            vec![Action::new("iso", ActionKind::Isolation, "shooter")
                .outcome("beat", Outcome::new(0.5, "end_made"))
                .outcome("covered", Outcome::new(0.5, "end_turnover"))],
        );
        let mut ctx = PlayContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut seen = false;
        for _ in 0..100 {
            let result = executor.execute_play(&play, &input(&off, &def), &mut ctx, &mut rng);
            seen |= result.badges.iter().any(|b| b.defensive && b.badge_id == "clamps");
        }
        assert!(seen);
    }

    #[test]
    fn test_zone_sends_paint_touch_to_anchor() {
        let guard = PlayerSnapshot::new("g", "G", Position::PG, 70);
        let big = PlayerSnapshot::new("b", "B", Position::C, 70).with_attribute(attr::INTERIOR_DEFENSE, 95);
        let actor = PlayerSnapshot::new("x", "X", Position::PG, 70);
        let defense = [&guard, &big];
        let zone = match_defender(&actor, ActionKind::Paint, &defense, DefensiveScheme::Zone23).unwrap();
        let man = match_defender(&actor, ActionKind::Paint, &defense, DefensiveScheme::Man).unwrap();
        assert_eq!(zone.id, "b");
        assert_eq!(man.id, "g");
        assert!(match_defender(&actor, ActionKind::Paint, &[], DefensiveScheme::Man).is_none());
    }
}
