pub mod box_score;
pub mod events;
pub mod play;
pub mod player;
pub mod roster_adapter;
pub mod team;

pub use box_score::{BoxScore, BoxScoreLine, TeamTotals, WireBoxScoreLine};
pub use events::{
    format_clock, BadgeActivation, ClutchPlay, CourtPoint, DegradedReport, Keyframe,
    PlayByPlayEntry, PossessionAnimation, SynergyActivation,
};
pub use play::{Action, ActionKind, Movement, NextStep, Outcome, Play, PlayError, PlayTag};
pub use player::{
    attr, AttributeCategory, Attributes, Badge, BadgeTier, PlayerId, PlayerSnapshot, Position,
    DEFAULT_ATTRIBUTE, PLACEHOLDER_PLAYER_ID,
};
pub use roster_adapter::{players_from_json, RawPlayerRecord};
pub use team::{
    CoachingSettings, DefensiveModifiers, DefensiveScheme, OffensiveScheme, StrategyParams,
    SubstitutionStrategy, TeamPair, TeamSetup, TeamSide,
};
