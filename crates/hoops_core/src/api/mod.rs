pub mod json_api;

pub use json_api::{
    simulate_game_json, simulate_quarter_json, GameRequest, GameResponse, QuarterRequest, QuarterResponse, TeamData,
    API_SCHEMA_VERSION,
};
