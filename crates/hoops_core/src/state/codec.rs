//! GameState encoding.
//!
//! Blob layout: `lz4(size-prepended msgpack) || sha256(compressed)`.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::migration::migrate_state;
use super::{GameState, StateError, STATE_VERSION};

const CHECKSUM_LEN: usize = 32;

/// Serialize, compress and checksum a game state.
pub fn to_blob(state: &GameState) -> Result<Vec<u8>, StateError> {
    let msgpack = to_vec_named(state)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut blob = compressed;
    blob.extend_from_slice(&checksum);
    Ok(blob)
}

/// Verify, decompress, decode and migrate a blob produced by [`to_blob`].
pub fn from_blob(bytes: &[u8]) -> Result<GameState, StateError> {
    // size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(StateError::Corrupted(format!("blob too short ({} bytes)", bytes.len())));
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize()[..] != *checksum {
        return Err(StateError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| StateError::Decompression)?;
    let state: GameState = from_slice(&msgpack)?;
    finish_load(state)
}

pub fn to_json(state: &GameState) -> Result<String, StateError> {
    Ok(serde_json::to_string(state)?)
}

pub fn from_json(json: &str) -> Result<GameState, StateError> {
    let state: GameState = serde_json::from_str(json)?;
    finish_load(state)
}

/// Decode a state already parsed into a JSON value.
pub fn from_value(value: serde_json::Value) -> Result<GameState, StateError> {
    let state: GameState = serde_json::from_value(value)?;
    finish_load(state)
}

fn finish_load(state: GameState) -> Result<GameState, StateError> {
    if state.version > STATE_VERSION {
        return Err(StateError::VersionMismatch { found: state.version, expected: STATE_VERSION });
    }
    let state = migrate_state(state)?;
    state.validate()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ClockConfig;
    use crate::models::TeamPair;
    use crate::state::test_support::roster;

    fn state() -> GameState {
        let mut state = GameState::new(roster("h"), roster("a"), 99, &ClockConfig::default());
        state.lineups = TeamPair::new(
            (0..5).map(|i| format!("h{}", i)).collect(),
            (0..5).map(|i| format!("a{}", i)).collect(),
        );
        state.starters = state.lineups.clone();
        state.scores = TeamPair::new(24, 19);
        state.quarter_scores = TeamPair::new(vec![24], vec![19]);
        state.rng_word_pos = 1234;
        state
    }

    #[test]
    fn test_blob_roundtrip() {
        let original = state();
        let blob = to_blob(&original).unwrap();
        let restored = from_blob(&blob).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_checksum_validation() {
        let mut blob = to_blob(&state()).unwrap();
        if let Some(last) = blob.last_mut() {
            *last = last.wrapping_add(1);
        }
        assert!(matches!(from_blob(&blob), Err(StateError::ChecksumMismatch)));
    }

    #[test]
    fn test_truncated_blob_is_corrupted() {
        assert!(matches!(from_blob(&[1, 2, 3]), Err(StateError::Corrupted(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut future = state();
        future.version = STATE_VERSION + 1;
        let blob = to_blob(&future).unwrap();
        assert!(matches!(
            from_blob(&blob),
            Err(StateError::VersionMismatch { found, .. }) if found == STATE_VERSION + 1
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let original = state();
        let json = to_json(&original).unwrap();
        assert_eq!(from_json(&json).unwrap(), original);
    }

    #[test]
    fn test_value_goes_through_migration() {
        let mut old = state();
        old.version = 2;
        old.teams.home.coaching.defensive_scheme = crate::models::DefensiveScheme::Zone23;
        let value = serde_json::to_value(&old).unwrap();
        let restored = from_value(value).unwrap();
        assert_eq!(restored.version, STATE_VERSION);
        assert_eq!(restored.teams.home.coaching.defensive_scheme, crate::models::DefensiveScheme::Man);
    }

    #[test]
    fn test_garbage_json_is_an_error() {
        let err = from_json("{\"quarter\": 2}").unwrap_err();
        assert!(err.is_recoverable());
    }
}
