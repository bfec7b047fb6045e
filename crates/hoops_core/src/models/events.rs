use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::box_score::WireBoxScoreLine;
use super::player::{BadgeTier, PlayerId};
use super::team::{TeamPair, TeamSide};

/// Court location in feet, origin at the basket, y toward half court.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CourtPoint {
    pub x: f32,
    pub y: f32,
}

impl CourtPoint {
    pub const HALF_WIDTH: f32 = 25.0;
    pub const HALF_COURT: f32 = 47.0;

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Moves by a delta, staying inside the half court.
    pub fn shifted(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: (self.x + dx).clamp(-Self::HALF_WIDTH, Self::HALF_WIDTH),
            y: (self.y + dy).clamp(0.0, Self::HALF_COURT),
        }
    }

    /// Guarding spot between this point and the basket.
    pub fn guarded(&self) -> Self {
        Self { x: self.x * 0.85, y: (self.y * 0.8).max(0.0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeActivation {
    pub player_id: PlayerId,
    pub badge_id: String,
    pub tier: BadgeTier,
    /// True for a defender's badge working against the offense.
    #[serde(default)]
    pub defensive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyActivation {
    pub synergy: String,
    pub players: (PlayerId, PlayerId),
    pub bonus: f64,
}

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds since the play started.
    pub time: f64,
    pub offense: BTreeMap<PlayerId, CourtPoint>,
    pub defense: BTreeMap<PlayerId, CourtPoint>,
    pub ball_carrier: Option<PlayerId>,
    pub description: String,
    /// Scoring or defensive-play annotation ("made", "blocked", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayByPlayEntry {
    pub possession: u32,
    pub quarter: u8,
    /// Game clock at the start of the possession, "M:SS".
    pub clock: String,
    pub team: String,
    pub play: String,
    pub outcome: String,
    pub points: u8,
    pub description: String,
    pub score_home: u32,
    pub score_away: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionAnimation {
    pub possession: u32,
    pub quarter: u8,
    pub clock: String,
    pub team: String,
    pub play: String,
    pub keyframes: Vec<Keyframe>,
    pub badges: Vec<BadgeActivation>,
    pub synergies: Vec<SynergyActivation>,
    /// Running box score after this possession.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_score: Option<TeamPair<Vec<WireBoxScoreLine>>>,
}

/// Late, close made basket kept as a game-winner candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClutchPlay {
    pub possession: u32,
    pub quarter: u8,
    pub clock: String,
    pub side: TeamSide,
    pub player_id: PlayerId,
    pub points: u8,
    pub score_home: u32,
    pub score_away: u32,
    pub description: String,
}

/// Counts of robustness fallbacks. Valid fixtures keep every counter at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedReport {
    /// Placeholder players created for empty lineups.
    pub placeholder_players: u32,
    /// Plays that stopped on an unresolved pointer or the step cap.
    pub truncated_plays: u32,
    /// Lineups rebuilt automatically because stored ids did not resolve.
    pub lineup_fallbacks: u32,
}

impl DegradedReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    pub fn absorb(&mut self, other: DegradedReport) {
        self.placeholder_players += other.placeholder_players;
        self.truncated_plays += other.truncated_plays;
        self.lineup_fallbacks += other.lineup_fallbacks;
    }
}

/// Game clock as "M:SS" from fractional minutes.
pub fn format_clock(minutes_remaining: f64) -> String {
    let total_secs = (minutes_remaining.max(0.0) * 60.0).round() as u32;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(10.0), "10:00");
        assert_eq!(format_clock(2.5), "2:30");
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(-1.0), "0:00");
    }

    #[test]
    fn test_court_point_stays_in_half_court() {
        let p = CourtPoint::new(24.0, 2.0).shifted(10.0, -10.0);
        assert_eq!(p, CourtPoint::new(25.0, 0.0));
    }

    #[test]
    fn test_degraded_report_absorb() {
        let mut total = DegradedReport::default();
        assert!(total.is_clean());
        total.absorb(DegradedReport { truncated_plays: 2, ..Default::default() });
        total.absorb(DegradedReport { placeholder_players: 1, ..Default::default() });
        assert_eq!(total.truncated_plays, 2);
        assert_eq!(total.placeholder_players, 1);
        assert!(!total.is_clean());
    }
}
