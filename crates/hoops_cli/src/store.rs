//! State files
//!
//! Game states are stored as compressed blobs. Writes go to a temp file
//! first and are renamed into place so a crash never leaves half a state.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use hoops_core::{from_blob, to_blob, GameState};

pub fn save_state(path: &Path, state: &GameState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let data = to_blob(state).context("Failed to encode game state")?;
    let temp_path = path.with_extension("tmp");
    {
        let mut file =
            File::create(&temp_path).with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(&data)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path).with_context(|| format!("Failed to move state into {}", path.display()))?;

    tracing::debug!(bytes = data.len(), path = %path.display(), "state saved");
    Ok(())
}

pub fn load_state(path: &Path) -> Result<GameState> {
    let data = fs::read(path).with_context(|| format!("Failed to read state file {}", path.display()))?;
    from_blob(&data).with_context(|| format!("Invalid state file {}", path.display()))
}

/// Reads a JSON document from a file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
