//! Attribute & badge resolver
//!
//! Pure functions: effective ratings from weighted attribute sets, badge
//! activation per action kind and badge synergies within a lineup.
//! Nothing here holds state or draws random numbers.

use std::collections::BTreeMap;

use crate::engine::config::ProbabilityConfig;
use crate::models::{
    ActionKind, BadgeActivation, PlayerId, PlayerSnapshot, SynergyActivation,
};
use crate::models::player::attr;

// ============================================================================
// Effective ratings
// ============================================================================

/// Weighted mean of the named attributes. Empty or non-positive weights fall
/// back to the overall rating; missing attributes read as league average.
pub fn weighted_rating<'a, I>(player: &PlayerSnapshot, weights: I) -> f64
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (name, w) in weights {
        if w <= 0.0 || !w.is_finite() {
            continue;
        }
        total += player.attribute(name) * w;
        weight_sum += w;
    }
    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        player.rating()
    }
}

/// Fatigue costs up to `max_fatigue_penalty` of the rating at 100 fatigue;
/// morale moves it by `morale_scale` points per point away from 50.
pub fn condition_adjusted(rating: f64, player: &PlayerSnapshot, cfg: &ProbabilityConfig) -> f64 {
    let fatigue = player.fatigue.clamp(0.0, 100.0) / 100.0;
    let morale = player.morale.clamp(0.0, 100.0) - 50.0;
    rating * (1.0 - fatigue * cfg.max_fatigue_penalty) + morale * cfg.morale_scale
}

/// Attribute weights used when an action does not list its own.
pub fn default_offense_weights(kind: ActionKind) -> &'static [(&'static str, f64)] {
    match kind {
        ActionKind::Pass => &[(attr::PASS_ACCURACY, 0.6), (attr::PASS_VISION, 0.4)],
        ActionKind::Handoff => &[(attr::BALL_HANDLING, 0.7), (attr::PASS_ACCURACY, 0.3)],
        ActionKind::Screen => &[(attr::STRENGTH, 0.7), (attr::OFFENSIVE_IQ, 0.3)],
        ActionKind::Cut => &[(attr::SPEED, 0.5), (attr::OFFENSIVE_IQ, 0.5)],
        ActionKind::Drive => &[
            (attr::BALL_HANDLING, 0.4),
            (attr::SPEED, 0.3),
            (attr::DRIVING_LAYUP, 0.3),
        ],
        ActionKind::PostUp => &[(attr::POST_CONTROL, 0.6), (attr::STRENGTH, 0.4)],
        ActionKind::Isolation => &[(attr::BALL_HANDLING, 0.6), (attr::ACCELERATION, 0.4)],
        ActionKind::MidRange => &[(attr::MID_RANGE, 1.0)],
        ActionKind::ThreePoint => &[(attr::THREE_POINT, 1.0)],
        ActionKind::Paint => &[
            (attr::CLOSE_SHOT, 0.4),
            (attr::DRIVING_LAYUP, 0.4),
            (attr::DRIVING_DUNK, 0.2),
        ],
    }
}

pub fn default_defense_weights(kind: ActionKind) -> &'static [(&'static str, f64)] {
    match kind {
        ActionKind::Pass => &[(attr::STEAL, 0.5), (attr::DEFENSIVE_IQ, 0.5)],
        ActionKind::Handoff => &[(attr::STEAL, 0.6), (attr::PERIMETER_DEFENSE, 0.4)],
        ActionKind::Screen => &[(attr::STRENGTH, 0.6), (attr::DEFENSIVE_IQ, 0.4)],
        ActionKind::Cut => &[(attr::HELP_DEFENSE, 0.6), (attr::SPEED, 0.4)],
        ActionKind::Drive => &[(attr::PERIMETER_DEFENSE, 0.6), (attr::SPEED, 0.4)],
        ActionKind::PostUp => &[(attr::INTERIOR_DEFENSE, 0.6), (attr::STRENGTH, 0.4)],
        ActionKind::Isolation => &[(attr::PERIMETER_DEFENSE, 1.0)],
        ActionKind::MidRange | ActionKind::ThreePoint => &[(attr::PERIMETER_DEFENSE, 1.0)],
        ActionKind::Paint => &[(attr::INTERIOR_DEFENSE, 0.6), (attr::BLOCK, 0.4)],
    }
}

/// Rating the actor brings to an action: the action's own offense weights
/// (or the kind's defaults), adjusted for fatigue and morale.
pub fn offense_rating(
    player: &PlayerSnapshot,
    kind: ActionKind,
    weights: &BTreeMap<String, f64>,
    cfg: &ProbabilityConfig,
) -> f64 {
    let raw = if weights.is_empty() {
        weighted_rating(player, default_offense_weights(kind).iter().copied())
    } else {
        weighted_rating(player, weights.iter().map(|(k, v)| (k.as_str(), *v)))
    };
    condition_adjusted(raw, player, cfg)
}

pub fn defense_rating(
    player: &PlayerSnapshot,
    kind: ActionKind,
    weights: &BTreeMap<String, f64>,
    cfg: &ProbabilityConfig,
) -> f64 {
    let raw = if weights.is_empty() {
        weighted_rating(player, default_defense_weights(kind).iter().copied())
    } else {
        weighted_rating(player, weights.iter().map(|(k, v)| (k.as_str(), *v)))
    };
    condition_adjusted(raw, player, cfg)
}

// ============================================================================
// Badges
// ============================================================================

/// Which action kinds a badge applies to.
#[derive(Debug, Clone, Copy)]
pub struct BadgeRule {
    pub id: &'static str,
    pub kinds: &'static [ActionKind],
    /// Worn by the defender; subtracts from the offense's advantage.
    pub defensive: bool,
}

const SHOTS: &[ActionKind] = &[ActionKind::ThreePoint, ActionKind::MidRange];
const FINISHES: &[ActionKind] = &[ActionKind::Paint, ActionKind::Drive];

pub const BADGE_RULES: &[BadgeRule] = &[
    // shooting
    BadgeRule { id: "dead_eye", kinds: SHOTS, defensive: false },
    BadgeRule { id: "catch_and_shoot", kinds: &[ActionKind::ThreePoint], defensive: false },
    BadgeRule { id: "limitless_range", kinds: &[ActionKind::ThreePoint], defensive: false },
    BadgeRule { id: "green_machine", kinds: SHOTS, defensive: false },
    BadgeRule { id: "mid_range_maestro", kinds: &[ActionKind::MidRange], defensive: false },
    // finishing
    BadgeRule { id: "posterizer", kinds: FINISHES, defensive: false },
    BadgeRule { id: "acrobat", kinds: FINISHES, defensive: false },
    BadgeRule { id: "slithery_finisher", kinds: FINISHES, defensive: false },
    BadgeRule {
        id: "post_spin_technician",
        kinds: &[ActionKind::PostUp, ActionKind::Paint],
        defensive: false,
    },
    BadgeRule { id: "dream_shake", kinds: &[ActionKind::PostUp], defensive: false },
    // playmaking
    BadgeRule {
        id: "floor_general",
        kinds: &[ActionKind::Pass, ActionKind::Handoff],
        defensive: false,
    },
    BadgeRule { id: "needle_threader", kinds: &[ActionKind::Pass], defensive: false },
    BadgeRule { id: "dimer", kinds: &[ActionKind::Pass, ActionKind::Handoff], defensive: false },
    BadgeRule {
        id: "ankle_breaker",
        kinds: &[ActionKind::Drive, ActionKind::Isolation],
        defensive: false,
    },
    BadgeRule {
        id: "handles_for_days",
        kinds: &[ActionKind::Drive, ActionKind::Isolation, ActionKind::Handoff],
        defensive: false,
    },
    BadgeRule {
        id: "pick_and_roll_maestro",
        kinds: &[ActionKind::Screen, ActionKind::Handoff, ActionKind::Pass],
        defensive: false,
    },
    BadgeRule { id: "brick_wall", kinds: &[ActionKind::Screen], defensive: false },
    // defense
    BadgeRule {
        id: "clamps",
        kinds: &[
            ActionKind::Drive,
            ActionKind::Isolation,
            ActionKind::ThreePoint,
            ActionKind::MidRange,
        ],
        defensive: true,
    },
    BadgeRule {
        id: "interceptor",
        kinds: &[ActionKind::Pass, ActionKind::Handoff],
        defensive: true,
    },
    BadgeRule {
        id: "pick_pocket",
        kinds: &[ActionKind::Drive, ActionKind::Isolation, ActionKind::Handoff],
        defensive: true,
    },
    BadgeRule {
        id: "rim_protector",
        kinds: &[ActionKind::Paint, ActionKind::Drive, ActionKind::PostUp],
        defensive: true,
    },
    BadgeRule { id: "anchor", kinds: &[ActionKind::Paint, ActionKind::PostUp], defensive: true },
    BadgeRule { id: "post_lockdown", kinds: &[ActionKind::PostUp], defensive: true },
    BadgeRule {
        id: "menace",
        kinds: &[ActionKind::ThreePoint, ActionKind::MidRange, ActionKind::Isolation],
        defensive: true,
    },
];

pub fn badge_rule(id: &str) -> Option<&'static BadgeRule> {
    BADGE_RULES.iter().find(|r| r.id == id)
}

/// Badges of `player` that apply to `kind` on the given side of the ball.
/// Unknown badge ids never activate.
pub fn activated_badges(
    player: &PlayerSnapshot,
    kind: ActionKind,
    defensive: bool,
) -> Vec<BadgeActivation> {
    player
        .badges
        .iter()
        .filter(|badge| {
            badge_rule(&badge.id)
                .map(|rule| rule.defensive == defensive && rule.kinds.contains(&kind))
                .unwrap_or(false)
        })
        .map(|badge| BadgeActivation {
            player_id: player.id.clone(),
            badge_id: badge.id.clone(),
            tier: badge.tier,
            defensive,
        })
        .collect()
}

/// Offensive tier boosts minus defensive tier boosts.
pub fn badge_boost(activations: &[BadgeActivation]) -> f64 {
    activations
        .iter()
        .map(|a| if a.defensive { -a.tier.boost() } else { a.tier.boost() })
        .sum()
}

// ============================================================================
// Synergies
// ============================================================================

/// Two badges that unlock a shot/finishing bonus when split across teammates.
#[derive(Debug, Clone, Copy)]
pub struct SynergyPair {
    pub name: &'static str,
    pub first: &'static str,
    pub second: &'static str,
    pub shot_bonus: f64,
}

pub const SYNERGY_PAIRS: &[SynergyPair] = &[
    SynergyPair {
        name: "kick_out",
        first: "floor_general",
        second: "catch_and_shoot",
        shot_bonus: 0.03,
    },
    SynergyPair {
        name: "two_man_game",
        first: "pick_and_roll_maestro",
        second: "brick_wall",
        shot_bonus: 0.04,
    },
    SynergyPair { name: "lob_city", first: "dimer", second: "posterizer", shot_bonus: 0.04 },
    SynergyPair {
        name: "backdoor",
        first: "needle_threader",
        second: "slithery_finisher",
        shot_bonus: 0.03,
    },
    SynergyPair {
        name: "inside_out",
        first: "post_spin_technician",
        second: "catch_and_shoot",
        shot_bonus: 0.02,
    },
];

/// A synergy open to `player` because `partner` holds the other half.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSynergy {
    pub synergy: &'static str,
    pub player: PlayerId,
    pub partner: PlayerId,
    pub bonus: f64,
}

impl ActiveSynergy {
    pub fn activation(&self) -> SynergyActivation {
        SynergyActivation {
            synergy: self.synergy.to_string(),
            players: (self.player.clone(), self.partner.clone()),
            bonus: self.bonus,
        }
    }
}

/// Every (player, partner) pairing within the five that completes a
/// synergy pair. A player is listed once per synergy.
pub fn active_synergies(lineup: &[&PlayerSnapshot]) -> Vec<ActiveSynergy> {
    let has = |p: &PlayerSnapshot, id: &str| p.badges.iter().any(|b| b.id == id);
    let mut active = Vec::new();

    for pair in SYNERGY_PAIRS {
        for player in lineup {
            let partner = lineup.iter().find(|other| {
                other.id != player.id
                    && ((has(player, pair.first) && has(other, pair.second))
                        || (has(player, pair.second) && has(other, pair.first)))
            });
            if let Some(partner) = partner {
                active.push(ActiveSynergy {
                    synergy: pair.name,
                    player: player.id.clone(),
                    partner: partner.id.clone(),
                    bonus: pair.shot_bonus,
                });
            }
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeTier, Position};

    #[test]
    fn test_weighted_rating_uses_defaults_for_missing() {
        let player = PlayerSnapshot::new("p1", "A", Position::SG, 80)
            .with_attribute(attr::THREE_POINT, 90);
        let rating = weighted_rating(&player, [(attr::THREE_POINT, 1.0), ("nonexistent", 1.0)]);
        assert_eq!(rating, 80.0);
        assert_eq!(weighted_rating(&player, []), 80.0);
    }

    #[test]
    fn test_condition_adjustment_bounds() {
        let cfg = ProbabilityConfig::default();
        let mut player = PlayerSnapshot::new("p1", "A", Position::SG, 80);
        assert_eq!(condition_adjusted(80.0, &player, &cfg), 80.0);

        player.fatigue = 100.0;
        assert!((condition_adjusted(80.0, &player, &cfg) - 72.0).abs() < 1e-9);

        player.fatigue = 0.0;
        player.morale = 100.0;
        assert!((condition_adjusted(80.0, &player, &cfg) - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_badge_activation_respects_kind_and_side() {
        let shooter = PlayerSnapshot::new("s", "Shooter", Position::SG, 80)
            .with_badge("dead_eye", BadgeTier::Gold)
            .with_badge("clamps", BadgeTier::Silver)
            .with_badge("made_up_badge", BadgeTier::HallOfFame);

        let offense = activated_badges(&shooter, ActionKind::ThreePoint, false);
        assert_eq!(offense.len(), 1);
        assert_eq!(offense[0].badge_id, "dead_eye");

        let defense = activated_badges(&shooter, ActionKind::ThreePoint, true);
        assert_eq!(defense.len(), 1);
        assert!(activated_badges(&shooter, ActionKind::Screen, false).is_empty());

        let boost = badge_boost(&[offense[0].clone(), defense[0].clone()]);
        assert!((boost - (0.05 - 0.03)).abs() < 1e-12);
    }

    #[test]
    fn test_synergy_needs_two_players() {
        let solo = PlayerSnapshot::new("a", "A", Position::PG, 80)
            .with_badge("floor_general", BadgeTier::Gold)
            .with_badge("catch_and_shoot", BadgeTier::Gold);
        let other = PlayerSnapshot::new("b", "B", Position::SG, 80);
        assert!(active_synergies(&[&solo, &other]).is_empty());

        let shooter =
            PlayerSnapshot::new("c", "C", Position::SF, 80).with_badge("catch_and_shoot", BadgeTier::Bronze);
        let active = active_synergies(&[&solo, &other, &shooter]);
        let kick_out: Vec<_> = active.iter().filter(|s| s.synergy == "kick_out").collect();
        assert_eq!(kick_out.len(), 2);
        assert!(kick_out.iter().any(|s| s.player == "c" && s.partner == "a"));
    }

    #[test]
    fn test_every_synergy_badge_has_a_rule() {
        for pair in SYNERGY_PAIRS {
            assert!(badge_rule(pair.first).is_some(), "{}", pair.first);
            assert!(badge_rule(pair.second).is_some(), "{}", pair.second);
        }
    }
}
