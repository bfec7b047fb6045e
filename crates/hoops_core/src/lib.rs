//! # hoops_core - Deterministic Basketball Game Simulation Engine
//!
//! Possession-by-possession basketball simulation with a serializable game
//! state, so one game can be played across several request/response cycles.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same result)
//! - Play graphs executed against player attributes, badges and schemes
//! - Pace-based rotations with a closing lineup for tight finishes
//! - Versioned, checksummed state blobs that resume mid-game exactly
//! - JSON API for easy integration

// Game engine APIs often require many parameters for state, config and RNG.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod state;

// Re-export main API functions
pub use api::{
    simulate_game_json, simulate_quarter_json, GameRequest, GameResponse, QuarterRequest, QuarterResponse,
};
pub use error::{Result, SimError};

// Re-export engine entry points
pub use engine::{
    EngineConfig, GameAdjustments, GameEngine, GameReport, LiveGame, LiveStep, PlaySelector, PlaybookSelector,
    QuarterReport,
};

// Re-export core models
pub use models::{PlayerSnapshot, Position, TeamPair, TeamSetup, TeamSide};

// Re-export state management
pub use state::{from_blob, to_blob, GameState, StateError, STATE_VERSION};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sha2::{Digest, Sha256};

    fn generate_test_team(prefix: &str) -> serde_json::Value {
        json!([
            {"id": format!("{}1", prefix), "name": "Point", "position": "PG", "overall": 82, "badges": [{"id": "floorGeneral", "tier": "gold"}]},
            {"id": format!("{}2", prefix), "name": "Wing", "position": "SG", "overall": 79, "badges": [{"id": "catchAndShoot", "tier": "silver"}]},
            {"id": format!("{}3", prefix), "name": "Forward", "position": "SF", "overall": 77},
            {"id": format!("{}4", prefix), "name": "Stretch", "position": "PF", "overall": 75},
            {"id": format!("{}5", prefix), "name": "Big", "position": "C", "overall": 78, "badges": [{"id": "rim_protector", "tier": "hof"}]},
            {"id": format!("{}6", prefix), "name": "Backup PG", "position": "PG", "overall": 70},
            {"id": format!("{}7", prefix), "name": "Backup SG", "position": "SG", "overall": 69},
            {"id": format!("{}8", prefix), "name": "Backup SF", "position": "SF", "overall": 68, "secondaryPosition": "PF"},
            {"id": format!("{}9", prefix), "name": "Backup PF", "position": "PF", "overall": 67},
            {"id": format!("{}10", prefix), "name": "Backup C", "position": "C", "overall": 66}
        ])
    }

    fn request(seed: u64) -> String {
        json!({
            "schema_version": 1,
            "seed": seed,
            "home_team": { "id": "home", "name": "Team A", "players": generate_test_team("h") },
            "away_team": { "id": "away", "name": "Team B", "players": generate_test_team("a") }
        })
        .to_string()
    }

    #[test]
    fn test_basic_simulation() {
        let parsed: serde_json::Value = serde_json::from_str(&simulate_game_json(&request(42)).unwrap()).unwrap();

        assert_eq!(parsed["schema_version"], 1);
        assert!(parsed["score_home"].is_number());
        assert!(parsed["score_away"].is_number());
        assert!(!parsed["play_by_play"].as_array().unwrap().is_empty());
        assert!(!parsed["animations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_determinism() {
        let request_str = request(999);
        let result1 = simulate_game_json(&request_str).unwrap();
        let result2 = simulate_game_json(&request_str).unwrap();
        assert_eq!(result1, result2, "Same seed should produce same result");
    }

    #[test]
    fn test_state_blob_determinism_sha256() {
        fn sha256_hex(bytes: &[u8]) -> String {
            let digest = Sha256::digest(bytes);
            digest.iter().map(|b| format!("{:02x}", b)).collect()
        }

        let run = || {
            let home = TeamSetup::new("h", "Home", models::players_from_json(&generate_test_team("h").to_string()).unwrap());
            let away = TeamSetup::new("a", "Away", models::players_from_json(&generate_test_team("a").to_string()).unwrap());
            let mut engine = GameEngine::with_config(home, away, 123_456, EngineConfig::headless()).unwrap();
            engine.simulate_game().unwrap();
            to_blob(&engine.snapshot_state()).unwrap()
        };

        let h1 = sha256_hex(&run());
        let h2 = sha256_hex(&run());
        assert_eq!(h1, h2, "Same seed should produce identical state blobs");
    }
}
