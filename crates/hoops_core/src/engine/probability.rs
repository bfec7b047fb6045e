//! Outcome probability modification and weighted sampling
//!
//! All functions are pure apart from the random draws they are handed, so
//! they can be tested without a running game.

use rand::Rng;
use std::collections::BTreeMap;

use crate::engine::config::{ProbabilityConfig, ReboundConfig};
use crate::models::{DefensiveModifiers, Outcome};

// ============================================================================
// Outcome classification
// ============================================================================

/// Which side an outcome key favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeBias {
    Offense,
    Defense,
    Neutral,
}

const DEFENSE_MARKERS: &[&str] =
    &["stolen", "steal", "turnover", "blocked", "block", "deflect", "covered"];
const OFFENSE_MARKERS: &[&str] =
    &["made", "finish", "open", "beat", "drive", "success", "complete", "score", "fouled"];

pub fn classify_outcome(key: &str) -> OutcomeBias {
    let key = key.to_ascii_lowercase();
    if DEFENSE_MARKERS.iter().any(|m| key.contains(m)) {
        OutcomeBias::Defense
    } else if OFFENSE_MARKERS.iter().any(|m| key.contains(m)) {
        OutcomeBias::Offense
    } else {
        OutcomeBias::Neutral
    }
}

#[inline]
pub fn is_made_key(key: &str) -> bool {
    key.contains("made") || key.contains("finish")
}

#[inline]
pub fn is_blocked_key(key: &str) -> bool {
    key.contains("block")
}

#[inline]
pub fn is_stolen_key(key: &str) -> bool {
    key.contains("stol") || key.contains("steal")
}

/// Scheme delta for one outcome key; keys that match nothing get 0.
pub fn scheme_delta(key: &str, modifiers: &DefensiveModifiers) -> f64 {
    if is_made_key(key) {
        modifiers.shot_modifier
    } else if key.contains("turnover") {
        modifiers.turnover_modifier
    } else if is_blocked_key(key) {
        modifiers.block_modifier
    } else if is_stolen_key(key) {
        modifiers.steal_modifier
    } else {
        0.0
    }
}

// ============================================================================
// Probability modification
// ============================================================================

/// Matchup inputs for one action.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeAdjustments {
    pub offense_rating: f64,
    pub defense_rating: f64,
    /// Offensive tier boosts minus defensive tier boosts.
    pub badge_boost: f64,
    pub scheme: DefensiveModifiers,
    /// Synergy bonus for made keys; only passed for shot actions.
    pub synergy_bonus: f64,
}

/// `(off − def)/2 + badge_boost × scale`
#[inline]
pub fn advantage(adj: &OutcomeAdjustments, cfg: &ProbabilityConfig) -> f64 {
    (adj.offense_rating - adj.defense_rating) / 2.0 + adj.badge_boost * cfg.badge_advantage_scale
}

/// Modified probabilities in key order. Each value is clamped to
/// `[min_probability, max_probability]` before the table is renormalised;
/// a table whose clamped sum is not positive is split evenly.
pub fn modify_outcome_probabilities(
    outcomes: &BTreeMap<String, Outcome>,
    adj: &OutcomeAdjustments,
    cfg: &ProbabilityConfig,
) -> Vec<(String, f64)> {
    let mut table = adjusted_probabilities(outcomes, adj, cfg);
    normalize(&mut table);
    table
}

/// Per-key adjusted probabilities, clamped but not yet renormalised.
pub fn adjusted_probabilities(
    outcomes: &BTreeMap<String, Outcome>,
    adj: &OutcomeAdjustments,
    cfg: &ProbabilityConfig,
) -> Vec<(String, f64)> {
    let divisor = if cfg.advantage_divisor.abs() < f64::EPSILON { 1.0 } else { cfg.advantage_divisor };
    let shift = advantage(adj, cfg) / divisor;

    outcomes
        .iter()
        .map(|(key, outcome)| {
            let mut p = outcome.probability;
            match classify_outcome(key) {
                OutcomeBias::Offense => p += shift,
                OutcomeBias::Defense => p -= shift,
                OutcomeBias::Neutral => {}
            }
            p += scheme_delta(key, &adj.scheme);
            if is_made_key(key) {
                p += adj.synergy_bonus;
            }
            p += outcome.modifier;
            let p = if p.is_finite() { p } else { cfg.min_probability };
            (key.clone(), p.clamp(cfg.min_probability, cfg.max_probability))
        })
        .collect()
}

/// Scales weights to sum to 1; equal split when the sum is not positive.
pub fn normalize(table: &mut [(String, f64)]) {
    if table.is_empty() {
        return;
    }
    let sum: f64 = table.iter().map(|(_, p)| *p).sum();
    if sum > 0.0 && sum.is_finite() {
        for (_, p) in table.iter_mut() {
            *p /= sum;
        }
    } else {
        let even = 1.0 / table.len() as f64;
        for (_, p) in table.iter_mut() {
            *p = even;
        }
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Index drawn proportionally to `weights`. Negative weights count as 0;
/// an all-zero table draws uniformly. `None` only for an empty table.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if !(total > 0.0 && total.is_finite()) {
        return Some(rng.gen_range(0..weights.len()));
    }

    let mut roll = rng.gen::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        let w = w.max(0.0);
        if roll < w {
            return Some(i);
        }
        roll -= w;
    }
    // Float slack lands on the last positive weight.
    weights.iter().rposition(|w| *w > 0.0)
}

/// Samples an outcome key from a normalised table.
pub fn sample_outcome<'a, R: Rng + ?Sized>(table: &'a [(String, f64)], rng: &mut R) -> Option<&'a str> {
    let weights: Vec<f64> = table.iter().map(|(_, p)| *p).collect();
    sample_index(&weights, rng).map(|i| table[i].0.as_str())
}

/// Picks an item with probability proportional to `weight(item)`.
pub fn weighted_pick<'a, T, R, F>(items: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let weights: Vec<f64> = items.iter().map(&weight).collect();
    sample_index(&weights, rng).map(|i| &items[i])
}

// ============================================================================
// Rebounds & free throws
// ============================================================================

/// `off / (off + def × defensive_advantage)`, clamped. Zero strengths fall
/// back to the floor.
pub fn offensive_rebound_chance(offense: f64, defense: f64, cfg: &ReboundConfig) -> f64 {
    let denom = offense.max(0.0) + defense.max(0.0) * cfg.defensive_advantage;
    let raw = if denom > 0.0 { offense.max(0.0) / denom } else { cfg.min_offensive_chance };
    raw.clamp(cfg.min_offensive_chance, cfg.max_offensive_chance)
}

pub fn free_throw_chance(rating: f64, cfg: &ProbabilityConfig) -> f64 {
    (rating / 100.0).clamp(cfg.min_free_throw, cfg.max_free_throw)
}
