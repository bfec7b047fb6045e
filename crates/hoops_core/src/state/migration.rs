use super::{GameState, StateError, STATE_VERSION};
use crate::models::{DefensiveScheme, TeamSide};

/// Upgrade a decoded state to [`STATE_VERSION`].
///
/// Missing fields have already been defaulted by serde; each step only
/// repairs what the older format could leave inconsistent.
pub fn migrate_state(mut state: GameState) -> Result<GameState, StateError> {
    let original_version = state.version;

    if original_version == 0 || original_version > STATE_VERSION {
        return Err(StateError::VersionMismatch { found: original_version, expected: STATE_VERSION });
    }

    if state.version == 1 {
        state = migrate_v1_to_v2(state);
    }
    if state.version == 2 {
        state = migrate_v2_to_v3(state);
    }
    if state.version == 3 {
        state = migrate_v3_to_v4(state);
    }

    repair_tallies(&mut state);

    if original_version != STATE_VERSION {
        log::info!("Migrated game state from version {} to {}", original_version, STATE_VERSION);
    }
    Ok(state)
}

/// v2 added the substitution strategy and target minutes.
fn migrate_v1_to_v2(mut state: GameState) -> GameState {
    log::info!("Migrating game state from version 1 to 2");

    for side in TeamSide::BOTH {
        let team = state.teams.get(side);
        let known: Vec<String> = team.players.iter().map(|p| p.id.clone()).collect();
        let targets = state.target_minutes.get_mut(side);
        let before = targets.len();
        targets.retain(|id, minutes| known.contains(id) && minutes.is_finite() && *minutes >= 0.0);
        if targets.len() != before {
            log::warn!("Dropped {} target-minute entries for unknown players ({:?})", before - targets.len(), side);
        }
    }

    state.version = 2;
    state
}

/// v3 added defensive schemes; v2 games were all man-to-man.
fn migrate_v2_to_v3(mut state: GameState) -> GameState {
    log::info!("Migrating game state from version 2 to 3");

    for side in TeamSide::BOTH {
        let coaching = &mut state.teams.get_mut(side).coaching;
        coaching.defensive_scheme = DefensiveScheme::Man;
        coaching.defensive_modifiers = None;
    }

    state.version = 3;
    state
}

/// v4 added synergy counts, clutch plays, degraded counters and the RNG
/// position. Older games resume from the start of their seed's stream.
fn migrate_v3_to_v4(mut state: GameState) -> GameState {
    log::info!("Migrating game state from version 3 to 4");

    if state.rng_word_pos == 0 && state.possession_count > 0 {
        log::warn!(
            "Game state has no RNG position after {} possessions; resuming from seed {}",
            state.possession_count,
            state.seed
        );
    }

    state.version = 4;
    state
}

/// Pads per-period tallies to the current quarter and fills in starters.
fn repair_tallies(state: &mut GameState) {
    let periods = usize::from(state.quarter.max(1));

    for side in TeamSide::BOTH {
        let quarters = state.quarter_scores.get_mut(side);
        if quarters.is_empty() && *state.scores.get(side) > 0 {
            // Score without a per-period breakdown lands in the first period.
            quarters.push(*state.scores.get(side));
        }
        if quarters.len() < periods {
            quarters.resize(periods, 0);
        }

        if state.starters.get(side).is_empty() && !state.lineups.get(side).is_empty() {
            *state.starters.get_mut(side) = state.lineups.get(side).clone();
        }
    }

    if state.quarter_possessions.len() < periods {
        state.quarter_possessions.resize(periods, 0);
    }
}

pub fn needs_migration(state: &GameState) -> bool {
    state.version < STATE_VERSION
}
