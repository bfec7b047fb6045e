//! Rotation policy.
//!
//! Called by the quarter loop at every rotation check. Players running ahead
//! of their target-minute pace are sat down in favour of rested players with
//! minutes left in their budget; late in a close game the best five play.
//!
//! ## Strategies
//! - `staggered`: sit at +1.5 min, up to 2 per check, one guard at a time
//! - `platoon`: sit at +1.0 min, up to 3 per check
//! - `tight_rotation`: sit at +3.0 min, up to 2 per check
//! - `deep_bench`: sit at +0.75 min, up to 3 per check

use std::collections::BTreeMap;

use super::config::EngineConfig;
use crate::models::{BoxScore, PlayerId, PlayerSnapshot, SubstitutionStrategy, TeamSetup};

/// Everything the policy needs for one team at one check.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionRequest<'a> {
    pub lineup: &'a [PlayerId],
    pub team: &'a TeamSetup,
    pub box_score: &'a BoxScore,
    pub target_minutes: &'a BTreeMap<PlayerId, f64>,
    pub strategy: SubstitutionStrategy,
    pub quarter: u8,
    /// Minutes left in the current period.
    pub time_remaining: f64,
    /// This team's score minus the opponent's.
    pub score_differential: i32,
    /// Game minutes played so far.
    pub elapsed_minutes: f64,
    /// The user is making this team's substitutions live.
    pub user_controlled_live: bool,
}

impl SubstitutionRequest<'_> {
    fn target(&self, id: &str) -> f64 {
        self.target_minutes.get(id).copied().unwrap_or(0.0)
    }

    /// Minutes played minus minutes expected at this point of the game.
    pub fn pace_delta(&self, id: &str, game_minutes: f64) -> f64 {
        let expected = if game_minutes > 0.0 {
            self.elapsed_minutes * self.target(id) / game_minutes
        } else {
            0.0
        };
        self.box_score.minutes(id) - expected
    }

    fn remaining_budget(&self, id: &str) -> f64 {
        self.target(id) - self.box_score.minutes(id)
    }
}

/// New lineup for the team, or `None` when nothing should change.
pub fn evaluate_substitutions(req: &SubstitutionRequest<'_>, config: &EngineConfig) -> Option<Vec<PlayerId>> {
    if req.user_controlled_live {
        return None;
    }

    let rotation = &config.rotation;
    let late = req.quarter >= config.clock.regulation_quarters && req.time_remaining <= rotation.close_game_minutes;
    if late && req.score_differential.unsigned_abs() <= rotation.close_game_threshold {
        return closing_lineup(req);
    }

    pace_substitutions(req, config.clock.regulation_minutes())
}

/// Top five healthy players; current players keep their slots.
fn closing_lineup(req: &SubstitutionRequest<'_>) -> Option<Vec<PlayerId>> {
    let best: Vec<&PlayerSnapshot> =
        req.team.by_rating().into_iter().filter(|p| p.is_healthy()).take(req.lineup.len()).collect();
    if best.len() < req.lineup.len() {
        return None;
    }

    let mut incoming = best.iter().filter(|p| !req.lineup.contains(&p.id));
    let mut next = req.lineup.to_vec();
    let mut changed = false;
    for slot in next.iter_mut() {
        if best.iter().any(|p| p.id == *slot) {
            continue;
        }
        if let Some(player) = incoming.next() {
            tracing::debug!(outgoing = %slot, incoming = %player.id, team = %req.team.name, "closing lineup substitution");
            *slot = player.id.clone();
            changed = true;
        }
    }

    changed.then_some(next)
}

fn pace_substitutions(req: &SubstitutionRequest<'_>, game_minutes: f64) -> Option<Vec<PlayerId>> {
    let params = req.strategy.params();

    let mut candidates: Vec<(usize, &PlayerSnapshot, f64)> = req
        .lineup
        .iter()
        .enumerate()
        .filter_map(|(slot, id)| req.team.player(id).map(|p| (slot, p)))
        .map(|(slot, p)| (slot, p, req.pace_delta(&p.id, game_minutes)))
        .filter(|(_, _, delta)| *delta >= params.pace_threshold)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut next = req.lineup.to_vec();
    let mut subs = 0usize;
    let mut guards_out = 0usize;

    for (slot, outgoing, delta) in candidates {
        if subs >= params.max_subs_per_check {
            break;
        }
        if params.protect_ball_handlers && outgoing.position.is_ball_handler() && guards_out >= 1 {
            continue;
        }
        let Some(replacement) = find_replacement(req, &next, outgoing) else {
            continue;
        };

        tracing::debug!(
            outgoing = %outgoing.id,
            incoming = %replacement.id,
            pace_delta = delta,
            strategy = %req.strategy,
            team = %req.team.name,
            "rotation substitution"
        );
        next[slot] = replacement.id.clone();
        subs += 1;
        if outgoing.position.is_ball_handler() {
            guards_out += 1;
        }
    }

    (subs > 0).then_some(next)
}

/// Healthy bench player with budget left; position fit first, then anyone.
/// Best rating wins, larger remaining budget breaks ties.
fn find_replacement<'a>(
    req: &SubstitutionRequest<'a>,
    on_court: &[PlayerId],
    outgoing: &PlayerSnapshot,
) -> Option<&'a PlayerSnapshot> {
    let available: Vec<&PlayerSnapshot> = req
        .team
        .players
        .iter()
        .filter(|p| p.is_healthy() && !on_court.contains(&p.id) && !req.lineup.contains(&p.id))
        .filter(|p| req.remaining_budget(&p.id) > 0.0)
        .collect();

    let best = |pool: Vec<&'a PlayerSnapshot>| {
        pool.into_iter().max_by(|a, b| {
            a.overall_rating
                .cmp(&b.overall_rating)
                .then_with(|| req.remaining_budget(&a.id).total_cmp(&req.remaining_budget(&b.id)))
                // earlier roster entry wins exact ties
                .then(std::cmp::Ordering::Greater)
        })
    };

    let fits: Vec<&PlayerSnapshot> =
        available.iter().copied().filter(|p| p.can_play(outgoing.position)).collect();
    best(fits).or_else(|| best(available))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lineup::validate_lineup;
    use crate::state::test_support::roster;
    use proptest::prelude::*;

    struct Fixture {
        team: TeamSetup,
        box_score: BoxScore,
        targets: BTreeMap<PlayerId, f64>,
        lineup: Vec<PlayerId>,
    }

    impl Fixture {
        fn new() -> Self {
            let team = roster("h");
            let box_score = BoxScore::for_roster(&team.players);
            let targets = crate::engine::lineup::ai_target_minutes(&team, 200.0);
            let lineup = (0..5).map(|i| format!("h{}", i)).collect();
            Self { team, box_score, targets, lineup }
        }

        fn request(&self, strategy: SubstitutionStrategy, elapsed: f64) -> SubstitutionRequest<'_> {
            SubstitutionRequest {
                lineup: &self.lineup,
                team: &self.team,
                box_score: &self.box_score,
                target_minutes: &self.targets,
                strategy,
                quarter: 1,
                time_remaining: 10.0 - elapsed,
                score_differential: 0,
                elapsed_minutes: elapsed,
                user_controlled_live: false,
            }
        }

        /// Starters played every minute so far.
        fn starters_played(&mut self, minutes: f64) {
            for id in &self.lineup {
                if let Some(line) = self.box_score.line_mut(id) {
                    line.minutes = minutes;
                }
            }
        }
    }

    #[test]
    fn test_live_user_team_is_left_alone() {
        let mut fx = Fixture::new();
        fx.starters_played(8.0);
        let mut req = fx.request(SubstitutionStrategy::Platoon, 8.0);
        req.user_controlled_live = true;
        assert!(evaluate_substitutions(&req, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_on_pace_starters_stay() {
        let mut fx = Fixture::new();
        fx.starters_played(2.0);
        let req = fx.request(SubstitutionStrategy::Staggered, 2.0);
        assert!(evaluate_substitutions(&req, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_platoon_subs_up_to_three() {
        let mut fx = Fixture::new();
        fx.starters_played(8.0);
        let req = fx.request(SubstitutionStrategy::Platoon, 8.0);
        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();

        let changed = next.iter().zip(&fx.lineup).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 3);
        assert_eq!(next.len(), 5);
    }

    #[test]
    fn test_staggered_keeps_a_guard_on_the_floor() {
        let mut fx = Fixture::new();
        fx.starters_played(8.0);
        // Guards furthest ahead of pace.
        fx.targets.insert("h0".into(), 1.0);
        fx.targets.insert("h1".into(), 1.0);
        let req = fx.request(SubstitutionStrategy::Staggered, 8.0);
        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();

        let guards_out = ["h0", "h1"].iter().filter(|id| !next.contains(&id.to_string())).count();
        assert_eq!(guards_out, 1);
    }

    #[test]
    fn test_replacement_prefers_position_fit() {
        let mut fx = Fixture::new();
        fx.starters_played(8.0);
        fx.targets.insert("h4".into(), 1.0);
        fx.targets.insert("h9".into(), 10.0);
        let req = fx.request(SubstitutionStrategy::TightRotation, 8.0);
        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();
        // h9 is the only bench centre.
        assert_eq!(next[4], "h9");
    }

    #[test]
    fn test_no_budget_means_no_sub() {
        let mut fx = Fixture::new();
        fx.starters_played(8.0);
        for (id, minutes) in fx.targets.iter_mut() {
            if !fx.lineup.contains(id) {
                *minutes = 0.0;
            }
        }
        let req = fx.request(SubstitutionStrategy::DeepBench, 8.0);
        assert!(evaluate_substitutions(&req, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_closing_lineup_in_close_game() {
        let mut fx = Fixture::new();
        // Bench unit on the floor: h5..h9.
        fx.lineup = (5..10).map(|i| format!("h{}", i)).collect();
        let mut req = fx.request(SubstitutionStrategy::Staggered, 37.0);
        req.quarter = 4;
        req.time_remaining = 3.0;
        req.score_differential = -4;

        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();
        let mut sorted = next.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["h0", "h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn test_closing_lineup_skips_injured_and_keeps_slots() {
        let mut fx = Fixture::new();
        fx.team.players[0].is_injured = true;
        // h1..h4 and h5 are the best healthy five; h5 is on the floor in slot 0.
        fx.lineup = vec!["h5".into(), "h1".into(), "h2".into(), "h3".into(), "h6".into()];
        let mut req = fx.request(SubstitutionStrategy::Staggered, 38.5);
        req.quarter = 4;
        req.time_remaining = 1.5;
        req.score_differential = 1;

        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();
        assert_eq!(next, vec!["h5", "h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn test_closing_lineup_already_on_floor() {
        let fx = Fixture::new();
        let mut req = fx.request(SubstitutionStrategy::Staggered, 39.0);
        req.quarter = 4;
        req.time_remaining = 1.0;
        assert!(evaluate_substitutions(&req, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_blowout_uses_pace_rules() {
        let mut fx = Fixture::new();
        fx.starters_played(36.0);
        let mut req = fx.request(SubstitutionStrategy::Platoon, 37.0);
        req.quarter = 4;
        req.time_remaining = 3.0;
        req.score_differential = 25;
        let next = evaluate_substitutions(&req, &EngineConfig::default()).unwrap();
        assert!(next.iter().any(|id| !fx.lineup.contains(id)));
        assert_eq!(next.len(), 5);
    }

    fn any_strategy() -> impl Strategy<Value = SubstitutionStrategy> {
        prop_oneof![
            Just(SubstitutionStrategy::Staggered),
            Just(SubstitutionStrategy::Platoon),
            Just(SubstitutionStrategy::TightRotation),
            Just(SubstitutionStrategy::DeepBench),
        ]
    }

    proptest! {
        #[test]
        fn prop_new_lineup_is_always_valid(
            on_court in proptest::sample::subsequence((0..12usize).collect::<Vec<_>>(), 5),
            injured in prop::collection::vec(any::<bool>(), 12),
            minutes in prop::collection::vec(0.0f64..48.0, 12),
            targets in prop::collection::vec(0.0f64..40.0, 12),
            strategy in any_strategy(),
            quarter in 1u8..=6,
            time_remaining in 0.0f64..12.0,
            score_differential in -20i32..=20,
            elapsed in 0.0f64..58.0,
        ) {
            let mut fx = Fixture::new();
            fx.lineup = on_court.iter().map(|i| format!("h{}", i)).collect();
            for (i, player) in fx.team.players.iter_mut().enumerate() {
                player.is_injured = injured[i] && !on_court.contains(&i);
                fx.targets.insert(player.id.clone(), targets[i]);
                if let Some(line) = fx.box_score.line_mut(&player.id) {
                    line.minutes = minutes[i];
                }
            }
            let request = SubstitutionRequest {
                strategy,
                quarter,
                time_remaining,
                score_differential,
                elapsed_minutes: elapsed,
                ..fx.request(strategy, elapsed)
            };

            if let Some(next) = evaluate_substitutions(&request, &EngineConfig::default()) {
                prop_assert!(validate_lineup(&fx.team, &next).is_ok(), "{:?} -> {:?}", fx.lineup, next);
            }
        }
    }
}
