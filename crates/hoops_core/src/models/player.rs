use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type PlayerId = String;

/// Rating used whenever an attribute is absent from a player's table.
pub const DEFAULT_ATTRIBUTE: f64 = 70.0;

/// Id of the synthetic stand-in used when a lineup comes up empty.
pub const PLACEHOLDER_PLAYER_ID: &str = "unknown_player";

/// Canonical attribute names.
pub mod attr {
    // offense
    pub const THREE_POINT: &str = "three_point";
    pub const MID_RANGE: &str = "mid_range";
    pub const CLOSE_SHOT: &str = "close_shot";
    pub const DRIVING_LAYUP: &str = "driving_layup";
    pub const DRIVING_DUNK: &str = "driving_dunk";
    pub const POST_CONTROL: &str = "post_control";
    pub const FREE_THROW: &str = "free_throw";
    pub const BALL_HANDLING: &str = "ball_handling";
    pub const PASS_ACCURACY: &str = "pass_accuracy";
    pub const PASS_VISION: &str = "pass_vision";
    // defense
    pub const PERIMETER_DEFENSE: &str = "perimeter_defense";
    pub const INTERIOR_DEFENSE: &str = "interior_defense";
    pub const STEAL: &str = "steal";
    pub const BLOCK: &str = "block";
    pub const OFFENSIVE_REBOUND: &str = "offensive_rebound";
    pub const DEFENSIVE_REBOUND: &str = "defensive_rebound";
    pub const HELP_DEFENSE: &str = "help_defense";
    // physical
    pub const SPEED: &str = "speed";
    pub const ACCELERATION: &str = "acceleration";
    pub const STRENGTH: &str = "strength";
    pub const VERTICAL: &str = "vertical";
    pub const STAMINA: &str = "stamina";
    // mental
    pub const OFFENSIVE_IQ: &str = "offensive_iq";
    pub const DEFENSIVE_IQ: &str = "defensive_iq";
    pub const CLUTCH: &str = "clutch";
    pub const CONSISTENCY: &str = "consistency";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    /// Slot order used for auto-selected lineups.
    pub const ALL: [Position; 5] =
        [Position::PG, Position::SG, Position::SF, Position::PF, Position::C];

    /// Primary ball-handlers (guards).
    #[inline]
    pub fn is_ball_handler(&self) -> bool {
        matches!(self, Position::PG | Position::SG)
    }

    #[inline]
    pub fn is_big(&self) -> bool {
        matches!(self, Position::PF | Position::C)
    }

    /// Rebounding weight by position.
    pub fn rebound_multiplier(&self) -> f64 {
        match self {
            Position::PG => 0.6,
            Position::SG => 0.7,
            Position::SF => 1.0,
            Position::PF => 1.3,
            Position::C => 1.5,
        }
    }

    /// Half-court spot (feet from the baseline centre) used as the starting
    /// point for keyframes.
    pub fn court_spot(&self) -> (f32, f32) {
        match self {
            Position::PG => (0.0, 28.0),
            Position::SG => (-20.0, 18.0),
            Position::SF => (20.0, 18.0),
            Position::PF => (-12.0, 8.0),
            Position::C => (8.0, 6.0),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        };
        f.write_str(s)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "PG" | "POINT_GUARD" | "1" => Ok(Position::PG),
            "SG" | "SHOOTING_GUARD" | "G" | "2" => Ok(Position::SG),
            "SF" | "SMALL_FORWARD" | "F" | "3" => Ok(Position::SF),
            "PF" | "POWER_FORWARD" | "4" => Ok(Position::PF),
            "C" | "CENTER" | "CENTRE" | "5" => Ok(Position::C),
            other => Err(format!("unknown position '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Offense,
    Defense,
    Physical,
    Mental,
}

impl AttributeCategory {
    pub fn known_attributes(&self) -> &'static [&'static str] {
        match self {
            AttributeCategory::Offense => &[
                attr::THREE_POINT,
                attr::MID_RANGE,
                attr::CLOSE_SHOT,
                attr::DRIVING_LAYUP,
                attr::DRIVING_DUNK,
                attr::POST_CONTROL,
                attr::FREE_THROW,
                attr::BALL_HANDLING,
                attr::PASS_ACCURACY,
                attr::PASS_VISION,
            ],
            AttributeCategory::Defense => &[
                attr::PERIMETER_DEFENSE,
                attr::INTERIOR_DEFENSE,
                attr::STEAL,
                attr::BLOCK,
                attr::OFFENSIVE_REBOUND,
                attr::DEFENSIVE_REBOUND,
                attr::HELP_DEFENSE,
            ],
            AttributeCategory::Physical => &[
                attr::SPEED,
                attr::ACCELERATION,
                attr::STRENGTH,
                attr::VERTICAL,
                attr::STAMINA,
            ],
            AttributeCategory::Mental => &[
                attr::OFFENSIVE_IQ,
                attr::DEFENSIVE_IQ,
                attr::CLUTCH,
                attr::CONSISTENCY,
            ],
        }
    }

    /// Category a canonical attribute name belongs to, if known.
    pub fn of(name: &str) -> Option<AttributeCategory> {
        [
            AttributeCategory::Offense,
            AttributeCategory::Defense,
            AttributeCategory::Physical,
            AttributeCategory::Mental,
        ]
        .into_iter()
        .find(|cat| cat.known_attributes().contains(&name))
    }
}

/// Nested attribute table (category → name → 0..=99).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub offense: BTreeMap<String, u8>,
    #[serde(default)]
    pub defense: BTreeMap<String, u8>,
    #[serde(default)]
    pub physical: BTreeMap<String, u8>,
    #[serde(default)]
    pub mental: BTreeMap<String, u8>,
}

impl Attributes {
    /// Every known attribute set to `value`.
    pub fn uniform(value: u8) -> Self {
        let mut attrs = Self::default();
        for cat in [
            AttributeCategory::Offense,
            AttributeCategory::Defense,
            AttributeCategory::Physical,
            AttributeCategory::Mental,
        ] {
            for name in cat.known_attributes() {
                attrs.set(cat, name, value);
            }
        }
        attrs
    }

    fn table(&self, cat: AttributeCategory) -> &BTreeMap<String, u8> {
        match cat {
            AttributeCategory::Offense => &self.offense,
            AttributeCategory::Defense => &self.defense,
            AttributeCategory::Physical => &self.physical,
            AttributeCategory::Mental => &self.mental,
        }
    }

    fn table_mut(&mut self, cat: AttributeCategory) -> &mut BTreeMap<String, u8> {
        match cat {
            AttributeCategory::Offense => &mut self.offense,
            AttributeCategory::Defense => &mut self.defense,
            AttributeCategory::Physical => &mut self.physical,
            AttributeCategory::Mental => &mut self.mental,
        }
    }

    pub fn set(&mut self, cat: AttributeCategory, name: &str, value: u8) {
        self.table_mut(cat).insert(name.to_string(), value.min(99));
    }

    /// Looks `name` up in its own category first, then every other category.
    /// Accepts `category.name` keys as well.
    pub fn get(&self, name: &str) -> Option<u8> {
        if let Some((cat, rest)) = name.split_once('.') {
            let cat = match cat {
                "offense" => AttributeCategory::Offense,
                "defense" => AttributeCategory::Defense,
                "physical" => AttributeCategory::Physical,
                "mental" => AttributeCategory::Mental,
                _ => return None,
            };
            return self.table(cat).get(rest).copied();
        }

        if let Some(cat) = AttributeCategory::of(name) {
            if let Some(v) = self.table(cat).get(name) {
                return Some(*v);
            }
        }
        self.offense
            .get(name)
            .or_else(|| self.defense.get(name))
            .or_else(|| self.physical.get(name))
            .or_else(|| self.mental.get(name))
            .copied()
    }

    /// Rating with the league-average default for missing attributes.
    #[inline]
    pub fn rating(&self, name: &str) -> f64 {
        self.get(name).map(f64::from).unwrap_or(DEFAULT_ATTRIBUTE)
    }

    pub fn is_empty(&self) -> bool {
        self.offense.is_empty()
            && self.defense.is_empty()
            && self.physical.is_empty()
            && self.mental.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    #[serde(alias = "hof", alias = "hallOfFame")]
    HallOfFame,
}

impl BadgeTier {
    /// Probability bonus contributed when the badge activates.
    pub fn boost(&self) -> f64 {
        match self {
            BadgeTier::Bronze => 0.01,
            BadgeTier::Silver => 0.03,
            BadgeTier::Gold => 0.05,
            BadgeTier::HallOfFame => 0.08,
        }
    }
}

impl FromStr for BadgeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "bronze" | "1" => Ok(BadgeTier::Bronze),
            "silver" | "2" => Ok(BadgeTier::Silver),
            "gold" | "3" => Ok(BadgeTier::Gold),
            "hall_of_fame" | "halloffame" | "hof" | "4" => Ok(BadgeTier::HallOfFame),
            other => Err(format!("unknown badge tier '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub tier: BadgeTier,
}

impl Badge {
    pub fn new(id: impl Into<String>, tier: BadgeTier) -> Self {
        Self { id: id.into(), tier }
    }
}

fn default_morale() -> f64 {
    50.0
}

/// Read-only view of a roster player for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub secondary_position: Option<Position>,
    pub overall_rating: u8,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// 0 = fresh, 100 = exhausted
    #[serde(default)]
    pub fatigue: f64,
    #[serde(default)]
    pub is_injured: bool,
    #[serde(default = "default_morale")]
    pub morale: f64,
    #[serde(default)]
    pub tendencies: BTreeMap<String, u8>,
}

impl PlayerSnapshot {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Position,
        overall_rating: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            secondary_position: None,
            overall_rating: overall_rating.min(99),
            attributes: Attributes::uniform(overall_rating.min(99)),
            badges: Vec::new(),
            fatigue: 0.0,
            is_injured: false,
            morale: default_morale(),
            tendencies: BTreeMap::new(),
        }
    }

    /// Synthetic league-average player used when a lineup is empty.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_PLAYER_ID, "Unknown Player", Position::SF, 70)
    }

    pub fn with_secondary(mut self, position: Position) -> Self {
        self.secondary_position = Some(position);
        self
    }

    pub fn with_attribute(mut self, name: &str, value: u8) -> Self {
        let cat = AttributeCategory::of(name).unwrap_or(AttributeCategory::Offense);
        self.attributes.set(cat, name, value);
        self
    }

    pub fn with_badge(mut self, id: &str, tier: BadgeTier) -> Self {
        self.badges.push(Badge::new(id, tier));
        self
    }

    pub fn injured(mut self) -> Self {
        self.is_injured = true;
        self
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> f64 {
        self.attributes.rating(name)
    }

    #[inline]
    pub fn rating(&self) -> f64 {
        f64::from(self.overall_rating)
    }

    pub fn badge_tier(&self, badge_id: &str) -> Option<BadgeTier> {
        self.badges.iter().find(|b| b.id == badge_id).map(|b| b.tier)
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        !self.is_injured
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_PLAYER_ID
    }

    /// Primary or secondary position match.
    pub fn can_play(&self, position: Position) -> bool {
        self.position == position || self.secondary_position == Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_defaults_to_league_average() {
        let player = PlayerSnapshot {
            attributes: Attributes::default(),
            ..PlayerSnapshot::new("p1", "Test", Position::PG, 80)
        };
        assert_eq!(player.attribute(attr::THREE_POINT), DEFAULT_ATTRIBUTE);
    }

    #[test]
    fn test_attribute_lookup_by_qualified_name() {
        let player = PlayerSnapshot::new("p1", "Test", Position::C, 60).with_attribute(attr::BLOCK, 91);
        assert_eq!(player.attributes.get("defense.block"), Some(91));
        assert_eq!(player.attributes.get("offense.block"), None);
        assert_eq!(player.attribute(attr::BLOCK), 91.0);
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("pg".parse::<Position>().unwrap(), Position::PG);
        assert_eq!("Center".parse::<Position>().unwrap(), Position::C);
        assert_eq!("power-forward".parse::<Position>().unwrap(), Position::PF);
        assert!("goalkeeper".parse::<Position>().is_err());
    }

    #[test]
    fn test_badge_tier_boosts_are_ordered() {
        assert!(BadgeTier::Bronze.boost() < BadgeTier::Silver.boost());
        assert!(BadgeTier::Silver.boost() < BadgeTier::Gold.boost());
        assert!(BadgeTier::Gold.boost() < BadgeTier::HallOfFame.boost());
        assert_eq!("hof".parse::<BadgeTier>().unwrap(), BadgeTier::HallOfFame);
    }

    #[test]
    fn test_can_play_secondary() {
        let player = PlayerSnapshot::new("p1", "Combo", Position::PG, 75).with_secondary(Position::SG);
        assert!(player.can_play(Position::SG));
        assert!(!player.can_play(Position::C));
    }

    #[test]
    fn test_player_snapshot_serde_defaults() {
        let json = r#"{"id":"p9","name":"Nine","position":"SF","overall_rating":77}"#;
        let player: PlayerSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(player.morale, 50.0);
        assert!(player.badges.is_empty());
        assert!(player.attributes.is_empty());
        assert_eq!(player.attribute(attr::SPEED), DEFAULT_ATTRIBUTE);
    }
}
