use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::player::PlayerSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    #[inline]
    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// One value per team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPair<T> {
    pub home: T,
    pub away: T,
}

impl<T> TeamPair<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    #[inline]
    pub fn get(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, side: TeamSide) -> &mut T {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    /// (offense, defense) style split borrow.
    pub fn split_mut(&mut self, first: TeamSide) -> (&mut T, &mut T) {
        match first {
            TeamSide::Home => (&mut self.home, &mut self.away),
            TeamSide::Away => (&mut self.away, &mut self.home),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffensiveScheme {
    #[default]
    Motion,
    PickAndRoll,
    RunAndGun,
    PostCentric,
    ThreePointHeavy,
    IsoHeavy,
}

impl OffensiveScheme {
    /// Share of possessions that start as a transition chance.
    pub fn transition_frequency(&self) -> f64 {
        match self {
            OffensiveScheme::Motion => 0.12,
            OffensiveScheme::PickAndRoll => 0.12,
            OffensiveScheme::RunAndGun => 0.30,
            OffensiveScheme::PostCentric => 0.07,
            OffensiveScheme::ThreePointHeavy => 0.16,
            OffensiveScheme::IsoHeavy => 0.10,
        }
    }
}

/// Probability deltas a defensive scheme applies to matching outcome keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefensiveModifiers {
    #[serde(default, alias = "shotModifier")]
    pub shot_modifier: f64,
    #[serde(default, alias = "turnoverModifier")]
    pub turnover_modifier: f64,
    #[serde(default, alias = "blockModifier")]
    pub block_modifier: f64,
    #[serde(default, alias = "stealModifier")]
    pub steal_modifier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefensiveScheme {
    #[default]
    Man,
    #[serde(alias = "zone_2_3", alias = "2-3")]
    Zone23,
    #[serde(alias = "zone_3_2", alias = "3-2")]
    Zone32,
    SwitchEverything,
    DropCoverage,
    FullCourtPress,
}

impl DefensiveScheme {
    pub fn modifiers(&self) -> DefensiveModifiers {
        match self {
            DefensiveScheme::Man => DefensiveModifiers::default(),
            DefensiveScheme::Zone23 => DefensiveModifiers {
                shot_modifier: -0.02,
                turnover_modifier: 0.01,
                block_modifier: 0.02,
                steal_modifier: 0.0,
            },
            DefensiveScheme::Zone32 => DefensiveModifiers {
                shot_modifier: -0.01,
                turnover_modifier: 0.01,
                block_modifier: 0.0,
                steal_modifier: 0.01,
            },
            DefensiveScheme::SwitchEverything => DefensiveModifiers {
                shot_modifier: -0.015,
                turnover_modifier: 0.0,
                block_modifier: -0.01,
                steal_modifier: 0.005,
            },
            DefensiveScheme::DropCoverage => DefensiveModifiers {
                shot_modifier: 0.01,
                turnover_modifier: -0.01,
                block_modifier: 0.03,
                steal_modifier: -0.01,
            },
            DefensiveScheme::FullCourtPress => DefensiveModifiers {
                shot_modifier: 0.02,
                turnover_modifier: 0.04,
                block_modifier: -0.01,
                steal_modifier: 0.03,
            },
        }
    }
}

/// Rotation parameters for a substitution strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    /// Minutes ahead of pace before a player becomes a sit candidate.
    pub pace_threshold: f64,
    pub max_subs_per_check: usize,
    /// At most one PG/SG may be taken out in the same check.
    pub protect_ball_handlers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionStrategy {
    #[default]
    Staggered,
    Platoon,
    TightRotation,
    DeepBench,
}

impl SubstitutionStrategy {
    pub fn params(&self) -> StrategyParams {
        match self {
            SubstitutionStrategy::Staggered => StrategyParams {
                pace_threshold: 1.5,
                max_subs_per_check: 2,
                protect_ball_handlers: true,
            },
            SubstitutionStrategy::Platoon => StrategyParams {
                pace_threshold: 1.0,
                max_subs_per_check: 3,
                protect_ball_handlers: false,
            },
            SubstitutionStrategy::TightRotation => StrategyParams {
                pace_threshold: 3.0,
                max_subs_per_check: 2,
                protect_ball_handlers: false,
            },
            SubstitutionStrategy::DeepBench => StrategyParams {
                pace_threshold: 0.75,
                max_subs_per_check: 3,
                protect_ball_handlers: false,
            },
        }
    }
}

impl fmt::Display for SubstitutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubstitutionStrategy::Staggered => "staggered",
            SubstitutionStrategy::Platoon => "platoon",
            SubstitutionStrategy::TightRotation => "tight_rotation",
            SubstitutionStrategy::DeepBench => "deep_bench",
        };
        f.write_str(s)
    }
}

impl FromStr for SubstitutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "staggered" => Ok(SubstitutionStrategy::Staggered),
            "platoon" => Ok(SubstitutionStrategy::Platoon),
            "tight_rotation" | "tight" => Ok(SubstitutionStrategy::TightRotation),
            "deep_bench" | "deep" => Ok(SubstitutionStrategy::DeepBench),
            other => Err(format!("unknown substitution strategy '{}'", other)),
        }
    }
}

/// Per-team coaching choices supplied by the scheme provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachingSettings {
    #[serde(default)]
    pub offensive_scheme: OffensiveScheme,
    #[serde(default)]
    pub defensive_scheme: DefensiveScheme,
    #[serde(default)]
    pub substitution_strategy: SubstitutionStrategy,
    /// Precomputed modifiers; the scheme table is used when absent.
    #[serde(default)]
    pub defensive_modifiers: Option<DefensiveModifiers>,
}

impl CoachingSettings {
    pub fn effective_defensive_modifiers(&self) -> DefensiveModifiers {
        self.defensive_modifiers
            .unwrap_or_else(|| self.defensive_scheme.modifiers())
    }
}

fn default_chemistry() -> f64 {
    50.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    pub id: String,
    pub name: String,
    pub players: Vec<PlayerSnapshot>,
    #[serde(default)]
    pub coaching: CoachingSettings,
    /// 0..=100, 50 = neutral
    #[serde(default = "default_chemistry")]
    pub chemistry: f64,
}

impl TeamSetup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, players: Vec<PlayerSnapshot>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            players,
            coaching: CoachingSettings::default(),
            chemistry: default_chemistry(),
        }
    }

    pub fn player(&self, id: &str) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn healthy_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_healthy()).count()
    }

    /// Roster sorted by overall rating, best first. Ties keep roster order.
    pub fn by_rating(&self) -> Vec<&PlayerSnapshot> {
        let mut sorted: Vec<&PlayerSnapshot> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.overall_rating.cmp(&a.overall_rating));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_pair_split_mut() {
        let mut pair = TeamPair::new(1, 2);
        let (off, def) = pair.split_mut(TeamSide::Away);
        *off += 10;
        *def += 20;
        assert_eq!(pair.home, 21);
        assert_eq!(pair.away, 12);
    }

    #[test]
    fn test_strategy_table_bounds() {
        for strategy in [
            SubstitutionStrategy::Staggered,
            SubstitutionStrategy::Platoon,
            SubstitutionStrategy::TightRotation,
            SubstitutionStrategy::DeepBench,
        ] {
            let params = strategy.params();
            assert!((2..=3).contains(&params.max_subs_per_check), "{}", strategy);
            assert!(params.pace_threshold > 0.0);
            assert_eq!(strategy.to_string().parse::<SubstitutionStrategy>().unwrap(), strategy);
        }
        assert!(SubstitutionStrategy::Staggered.params().protect_ball_handlers);
    }

    #[test]
    fn test_defensive_modifiers_are_small() {
        for scheme in [
            DefensiveScheme::Man,
            DefensiveScheme::Zone23,
            DefensiveScheme::Zone32,
            DefensiveScheme::SwitchEverything,
            DefensiveScheme::DropCoverage,
            DefensiveScheme::FullCourtPress,
        ] {
            let m = scheme.modifiers();
            for v in [m.shot_modifier, m.turnover_modifier, m.block_modifier, m.steal_modifier] {
                assert!((-0.1..=0.1).contains(&v));
            }
        }
    }

    #[test]
    fn test_precomputed_modifiers_override_scheme_table() {
        let mut coaching = CoachingSettings {
            defensive_scheme: DefensiveScheme::FullCourtPress,
            ..Default::default()
        };
        assert_eq!(coaching.effective_defensive_modifiers(), DefensiveScheme::FullCourtPress.modifiers());

        coaching.defensive_modifiers = Some(DefensiveModifiers { shot_modifier: -0.05, ..Default::default() });
        assert_eq!(coaching.effective_defensive_modifiers().shot_modifier, -0.05);
    }

    #[test]
    fn test_scheme_serde_names() {
        let scheme: DefensiveScheme = serde_json::from_str("\"zone_2_3\"").unwrap();
        assert_eq!(scheme, DefensiveScheme::Zone23);
        let json = serde_json::to_string(&SubstitutionStrategy::TightRotation).unwrap();
        assert_eq!(json, "\"tight_rotation\"");
    }
}
