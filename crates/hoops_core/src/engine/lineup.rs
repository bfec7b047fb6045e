//! Lineup construction and checks.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, SimError};
use crate::models::{PlayerId, PlayerSnapshot, Position, TeamSetup, TeamSide};

pub const LINEUP_SIZE: usize = 5;

/// Rank template for AI target minutes, best player first.
const TARGET_TEMPLATE: [f64; 9] = [34.0, 32.0, 30.0, 28.0, 26.0, 18.0, 14.0, 10.0, 8.0];
const MAX_TARGET_MINUTES: f64 = 40.0;

/// Best available five in PG, SG, SF, PF, C slot order.
///
/// Each slot takes the best healthy primary-position player, then the best
/// secondary-position player; slots still open get the best healthy players
/// left. Fails only when fewer than five players are healthy.
pub fn auto_select_lineup(side: TeamSide, team: &TeamSetup) -> Result<Vec<PlayerId>> {
    let healthy = team.healthy_count();
    if healthy < LINEUP_SIZE {
        return Err(SimError::UnresolvableLineup { side, healthy });
    }

    let ranked: Vec<&PlayerSnapshot> = team.by_rating().into_iter().filter(|p| p.is_healthy()).collect();
    let mut slots: [Option<&PlayerSnapshot>; LINEUP_SIZE] = [None; LINEUP_SIZE];
    let mut used: HashSet<&str> = HashSet::new();

    // Primary position, then secondary, then anyone.
    for pass in 0..3 {
        for (slot, position) in slots.iter_mut().zip(Position::ALL) {
            if slot.is_some() {
                continue;
            }
            let fits = |p: &PlayerSnapshot| match pass {
                0 => p.position == position,
                1 => p.secondary_position == Some(position),
                _ => true,
            };
            if let Some(player) = ranked.iter().copied().find(|p| !used.contains(p.id.as_str()) && fits(p)) {
                used.insert(player.id.as_str());
                *slot = Some(player);
            }
        }
    }

    Ok(slots.iter().flatten().map(|p| p.id.clone()).collect())
}

/// Five distinct, rostered, healthy players.
pub fn validate_lineup(team: &TeamSetup, lineup: &[PlayerId]) -> Result<()> {
    if lineup.len() != LINEUP_SIZE {
        return Err(SimError::InvalidLineup(format!(
            "{} needs {} players, got {}",
            team.name,
            LINEUP_SIZE,
            lineup.len()
        )));
    }
    let mut seen = HashSet::new();
    for id in lineup {
        if !seen.insert(id.as_str()) {
            return Err(SimError::InvalidLineup(format!("{} is listed twice", id)));
        }
        let player = team.player(id).ok_or_else(|| SimError::UnknownPlayer(id.clone()))?;
        if !player.is_healthy() {
            return Err(SimError::InvalidLineup(format!("{} is injured", player.name)));
        }
    }
    Ok(())
}

/// Stored lineup if still valid, otherwise a fresh auto-selected one.
/// The flag is `true` when the fallback was used.
pub fn restore_lineup(side: TeamSide, team: &TeamSetup, stored: &[PlayerId]) -> Result<(Vec<PlayerId>, bool)> {
    match validate_lineup(team, stored) {
        Ok(()) => Ok((stored.to_vec(), false)),
        Err(err) => {
            tracing::warn!(?side, team = %team.name, error = %err, "stored lineup invalid; auto-selecting");
            Ok((auto_select_lineup(side, team)?, true))
        }
    }
}

/// Target minutes from the rank template, scaled to `team_minutes` and capped
/// at a full game. Injured players get 0.
pub fn ai_target_minutes(team: &TeamSetup, team_minutes: f64) -> BTreeMap<PlayerId, f64> {
    let ranked: Vec<&PlayerSnapshot> = team.by_rating().into_iter().filter(|p| p.is_healthy()).collect();
    let template_total: f64 = TARGET_TEMPLATE.iter().take(ranked.len()).sum();
    let scale = if template_total > 0.0 { team_minutes / template_total } else { 0.0 };

    let mut targets: BTreeMap<PlayerId, f64> = team.players.iter().map(|p| (p.id.clone(), 0.0)).collect();
    for (rank, player) in ranked.iter().enumerate() {
        let base = TARGET_TEMPLATE.get(rank).copied().unwrap_or(0.0);
        targets.insert(player.id.clone(), (base * scale).min(MAX_TARGET_MINUTES));
    }
    targets
}

/// Snapshots for the given ids, skipping ids not on the roster.
pub fn lineup_players<'a>(team: &'a TeamSetup, lineup: &[PlayerId]) -> Vec<&'a PlayerSnapshot> {
    lineup.iter().filter_map(|id| team.player(id)).collect()
}
