//! Embedded game data
//!
//! - Default playbook (half-court, transition and late-game sets)

pub mod playbook;

pub use playbook::{default_playbook, Playbook, PLAYBOOK_JSON};
