use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PlayerSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScoreLine {
    pub player_id: PlayerId,
    pub name: String,
    pub minutes: f64,
    pub points: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
}

impl BoxScoreLine {
    pub fn new(player: &PlayerSnapshot) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }

    /// Records a field-goal attempt; `points` is 2 or 3.
    pub fn record_field_goal(&mut self, points: u8, made: bool) {
        self.field_goals_attempted += 1;
        if points >= 3 {
            self.three_pointers_attempted += 1;
        }
        if made {
            self.field_goals_made += 1;
            if points >= 3 {
                self.three_pointers_made += 1;
            }
            self.points += u32::from(points);
        }
    }

    pub fn record_free_throws(&mut self, made: u8, attempted: u8) {
        self.free_throws_made += u32::from(made);
        self.free_throws_attempted += u32::from(attempted);
        self.points += u32::from(made);
    }

    pub fn to_wire(&self) -> WireBoxScoreLine {
        WireBoxScoreLine {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            min: (self.minutes * 10.0).round() / 10.0,
            pts: self.points,
            reb: self.rebounds(),
            oreb: self.offensive_rebounds,
            dreb: self.defensive_rebounds,
            ast: self.assists,
            stl: self.steals,
            blk: self.blocks,
            tov: self.turnovers,
            pf: self.fouls,
            fgm: self.field_goals_made,
            fga: self.field_goals_attempted,
            fg3m: self.three_pointers_made,
            fg3a: self.three_pointers_attempted,
            ftm: self.free_throws_made,
            fta: self.free_throws_attempted,
        }
    }
}

/// Flattened, renamed box-score row for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBoxScoreLine {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub name: String,
    pub min: f64,
    pub pts: u32,
    pub reb: u32,
    pub oreb: u32,
    pub dreb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub pf: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fg3m: u32,
    pub fg3a: u32,
    pub ftm: u32,
    pub fta: u32,
}

/// One team's box score: a line for every rostered player, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub lines: Vec<BoxScoreLine>,
}

impl BoxScore {
    pub fn for_roster(players: &[PlayerSnapshot]) -> Self {
        Self { lines: players.iter().map(BoxScoreLine::new).collect() }
    }

    pub fn line(&self, player_id: &str) -> Option<&BoxScoreLine> {
        self.lines.iter().find(|l| l.player_id == player_id)
    }

    pub fn line_mut(&mut self, player_id: &str) -> Option<&mut BoxScoreLine> {
        self.lines.iter_mut().find(|l| l.player_id == player_id)
    }

    /// Minutes played so far, 0 for unknown ids.
    pub fn minutes(&self, player_id: &str) -> f64 {
        self.line(player_id).map(|l| l.minutes).unwrap_or(0.0)
    }

    /// Adds a line for a player that joined mid-game (no-op if present).
    pub fn ensure_line(&mut self, player: &PlayerSnapshot) {
        if self.line(&player.id).is_none() {
            self.lines.push(BoxScoreLine::new(player));
        }
    }

    pub fn total_points(&self) -> u32 {
        self.lines.iter().map(|l| l.points).sum()
    }

    pub fn total_minutes(&self) -> f64 {
        self.lines.iter().map(|l| l.minutes).sum()
    }

    pub fn totals(&self) -> TeamTotals {
        let mut t = TeamTotals::default();
        for l in &self.lines {
            t.points += l.points;
            t.rebounds += l.rebounds();
            t.assists += l.assists;
            t.steals += l.steals;
            t.blocks += l.blocks;
            t.turnovers += l.turnovers;
            t.fouls += l.fouls;
            t.field_goals_made += l.field_goals_made;
            t.field_goals_attempted += l.field_goals_attempted;
            t.three_pointers_made += l.three_pointers_made;
            t.three_pointers_attempted += l.three_pointers_attempted;
            t.free_throws_made += l.free_throws_made;
            t.free_throws_attempted += l.free_throws_attempted;
        }
        t
    }

    pub fn to_wire(&self) -> Vec<WireBoxScoreLine> {
        self.lines.iter().map(BoxScoreLine::to_wire).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
}

impl TeamTotals {
    pub fn field_goal_pct(&self) -> f64 {
        if self.field_goals_attempted > 0 {
            f64::from(self.field_goals_made) / f64::from(self.field_goals_attempted)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::Position;

    #[test]
    fn test_record_three_pointer() {
        let player = PlayerSnapshot::new("p1", "Shooter", Position::SG, 80);
        let mut line = BoxScoreLine::new(&player);
        line.record_field_goal(3, true);
        line.record_field_goal(3, false);
        line.record_field_goal(2, true);

        assert_eq!(line.points, 5);
        assert_eq!(line.field_goals_attempted, 3);
        assert_eq!(line.field_goals_made, 2);
        assert_eq!(line.three_pointers_attempted, 2);
        assert_eq!(line.three_pointers_made, 1);
    }

    #[test]
    fn test_wire_format_renames_and_rounds() {
        let player = PlayerSnapshot::new("p1", "Big", Position::C, 80);
        let mut line = BoxScoreLine::new(&player);
        line.minutes = 12.3456;
        line.offensive_rebounds = 2;
        line.defensive_rebounds = 5;
        line.record_free_throws(1, 2);

        let wire = serde_json::to_value(line.to_wire()).unwrap();
        assert_eq!(wire["playerId"], "p1");
        assert_eq!(wire["min"], 12.3);
        assert_eq!(wire["reb"], 7);
        assert_eq!(wire["pts"], 1);
        assert_eq!(wire["fta"], 2);
    }

    #[test]
    fn test_box_score_covers_whole_roster() {
        let roster: Vec<PlayerSnapshot> = (0..12)
            .map(|i| PlayerSnapshot::new(format!("p{}", i), format!("P{}", i), Position::SF, 70))
            .collect();
        let box_score = BoxScore::for_roster(&roster);
        assert_eq!(box_score.lines.len(), 12);
        assert_eq!(box_score.total_points(), 0);
        assert!(box_score.line("p11").is_some());
    }
}
