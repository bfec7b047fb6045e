//! Embedded default playbook
//!
//! `playbook.json` is compiled into the binary with `include_str!` and parsed
//! once on first use. Every play is validated at load time; a bad playbook is
//! reported as a [`PlayError`] instead of surfacing mid-game.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::{Play, PlayError, PlayTag};

/// Default playbook JSON
pub const PLAYBOOK_JSON: &str = include_str!("playbook.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default = "default_version")]
    pub version: u32,
    pub plays: Vec<Play>,
}

fn default_version() -> u32 {
    1
}

impl Playbook {
    /// Parses and validates a playbook document.
    pub fn from_json(json: &str) -> Result<Self, PlayError> {
        let playbook: Playbook = serde_json::from_str(json).map_err(|e| PlayError {
            play: "<playbook>".to_string(),
            reason: e.to_string(),
        })?;
        playbook.validate()?;
        Ok(playbook)
    }

    /// Non-empty, unique play names, every play graph valid.
    pub fn validate(&self) -> Result<(), PlayError> {
        if self.plays.is_empty() {
            return Err(PlayError {
                play: "<playbook>".to_string(),
                reason: "playbook has no plays".to_string(),
            });
        }
        let mut names = HashSet::new();
        for play in &self.plays {
            if !names.insert(play.name.as_str()) {
                return Err(PlayError {
                    play: play.name.clone(),
                    reason: "duplicate play name".to_string(),
                });
            }
            if !(play.weight.is_finite() && play.weight >= 0.0) {
                return Err(PlayError {
                    play: play.name.clone(),
                    reason: "weight must be a non-negative number".to_string(),
                });
            }
            play.validate()?;
        }
        Ok(())
    }

    pub fn play(&self, name: &str) -> Option<&Play> {
        self.plays.iter().find(|p| p.name == name)
    }

    pub fn tagged(&self, tag: PlayTag) -> impl Iterator<Item = &Play> {
        self.plays.iter().filter(move |p| p.tags.contains(&tag))
    }
}

static DEFAULT_PLAYBOOK: OnceLock<Result<Playbook, PlayError>> = OnceLock::new();

/// The embedded playbook, parsed and validated on first call.
pub fn default_playbook() -> Result<&'static Playbook, PlayError> {
    DEFAULT_PLAYBOOK
        .get_or_init(|| Playbook::from_json(PLAYBOOK_JSON))
        .as_ref()
        .map_err(Clone::clone)
}
