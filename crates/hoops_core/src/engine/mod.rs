//! # Simulation Engine
//!
//! Possession-by-possession game simulation.
//!
//! - [`game`]: quarter loop, rotation checks, overtime, resume from state
//! - [`possession`]: one possession applied to the box scores
//! - [`play_executor`]: walks a play's action graph
//! - [`play_selector`]: picks the play to run
//! - [`substitutions`]: pace-based rotation policy
//! - [`live`]: user-controlled games

pub mod attributes;
pub mod config;
pub mod game;
pub mod lineup;
pub mod live;
pub mod play_executor;
pub mod play_selector;
pub mod possession;
pub mod probability;
pub mod roles;
pub mod substitutions;


pub use config::{ClockConfig, CreditConfig, EngineConfig, ProbabilityConfig, ReboundConfig, RotationConfig};
pub use game::{
    GameAdjustments, GameEngine, GameLog, GameReport, PeriodEnd, PlayerGameDelta, PossessionStep, QuarterReport,
};
pub use lineup::{ai_target_minutes, auto_select_lineup, validate_lineup, LINEUP_SIZE};
pub use live::{LiveGame, LiveStep};
pub use play_executor::{PlayContext, PlayExecutor, PlayInput, PlayOutcome, PlayResult};
pub use play_selector::{PlaySelector, PlaybookSelector, SelectionContext};
pub use possession::{simulate_possession, PossessionOutcome};
pub use substitutions::{evaluate_substitutions, SubstitutionRequest};
