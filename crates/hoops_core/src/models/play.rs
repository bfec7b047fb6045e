//! Play graph data.
//!
//! A [`Play`] is an ordered list of [`Action`] nodes. Execution starts at the
//! first action and follows each sampled [`Outcome`]'s `next` pointer until a
//! terminal step. Plays are immutable once loaded; [`Play::validate`] checks
//! the graph so malformed data is rejected up front.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::team::OffensiveScheme;

/// Where an outcome leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NextStep {
    Action(String),
    EndMade,
    EndTurnover,
    /// Any other `end_*` marker. The play finishes without a turnover.
    Completed(String),
    ReboundBattle,
    FreeThrows,
}

impl NextStep {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "end_made" => NextStep::EndMade,
            "end_turnover" => NextStep::EndTurnover,
            "rebound_battle" => NextStep::ReboundBattle,
            "free_throws" => NextStep::FreeThrows,
            other if other.starts_with("end_") => NextStep::Completed(other.to_string()),
            other => NextStep::Action(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NextStep::Action(id) => id,
            NextStep::EndMade => "end_made",
            NextStep::EndTurnover => "end_turnover",
            NextStep::Completed(marker) => marker,
            NextStep::ReboundBattle => "rebound_battle",
            NextStep::FreeThrows => "free_throws",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NextStep::Action(_))
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NextStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NextStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NextStep::parse(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pass,
    Handoff,
    Screen,
    Cut,
    Drive,
    PostUp,
    Isolation,
    MidRange,
    ThreePoint,
    Paint,
}

impl ActionKind {
    #[inline]
    pub fn is_shot(&self) -> bool {
        matches!(self, ActionKind::MidRange | ActionKind::ThreePoint | ActionKind::Paint)
    }

    /// Moves the ball to the receiver when successful.
    #[inline]
    pub fn transfers_ball(&self) -> bool {
        matches!(self, ActionKind::Pass | ActionKind::Handoff)
    }

    pub fn shot_points(&self) -> u8 {
        match self {
            ActionKind::ThreePoint => 3,
            _ => 2,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Pass => "passes",
            ActionKind::Handoff => "hands off",
            ActionKind::Screen => "sets a screen",
            ActionKind::Cut => "cuts",
            ActionKind::Drive => "drives",
            ActionKind::PostUp => "posts up",
            ActionKind::Isolation => "isolates",
            ActionKind::MidRange => "pulls up from mid-range",
            ActionKind::ThreePoint => "fires from three",
            ActionKind::Paint => "attacks the rim",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub probability: f64,
    #[serde(default)]
    pub modifier: f64,
    pub next: NextStep,
    #[serde(default)]
    pub points: Option<u8>,
}

impl Outcome {
    pub fn new(probability: f64, next: &str) -> Self {
        Self { probability, modifier: 0.0, next: NextStep::parse(next), points: None }
    }

    pub fn with_points(mut self, points: u8) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_modifier(mut self, modifier: f64) -> Self {
        self.modifier = modifier;
        self
    }
}

fn default_duration() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub actor: String,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub movement: Option<Movement>,
    /// Seconds of game time the action takes.
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub offense_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub defense_weights: BTreeMap<String, f64>,
    pub outcomes: BTreeMap<String, Outcome>,
    /// Keyframe text; `{actor}` and `{receiver}` are replaced with names.
    #[serde(default)]
    pub description: Option<String>,
}

impl Action {
    pub fn new(id: &str, kind: ActionKind, actor: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            actor: actor.to_string(),
            receiver: None,
            movement: None,
            duration: default_duration(),
            offense_weights: BTreeMap::new(),
            defense_weights: BTreeMap::new(),
            outcomes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn receiver(mut self, role: &str) -> Self {
        self.receiver = Some(role.to_string());
        self
    }

    pub fn offense_weight(mut self, attribute: &str, weight: f64) -> Self {
        self.offense_weights.insert(attribute.to_string(), weight);
        self
    }

    pub fn defense_weight(mut self, attribute: &str, weight: f64) -> Self {
        self.defense_weights.insert(attribute.to_string(), weight);
        self
    }

    pub fn outcome(mut self, key: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(key.to_string(), outcome);
        self
    }
}

/// Selection hints read by the default play selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayTag {
    /// Looks for a quick three when trailing late.
    LateGameThree,
    /// Looks for a quick two when trailing late.
    QuickTwo,
    /// Safe clock-killing set when ahead late.
    ClockKiller,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub name: String,
    pub actions: Vec<Action>,
    /// Schemes that run this play; empty means every scheme.
    #[serde(default)]
    pub schemes: Vec<OffensiveScheme>,
    #[serde(default)]
    pub transition: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub tags: Vec<PlayTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayError {
    pub play: String,
    pub reason: String,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid play '{}': {}", self.play, self.reason)
    }
}

impl std::error::Error for PlayError {}

impl Play {
    pub fn new(name: &str, actions: Vec<Action>) -> Self {
        Self {
            name: name.to_string(),
            actions,
            schemes: Vec::new(),
            transition: false,
            weight: default_weight(),
            tags: Vec::new(),
        }
    }

    pub fn entry(&self) -> Option<&Action> {
        self.actions.first()
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Roles in order of first appearance (actors before receivers).
    pub fn roles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut roles = Vec::new();
        for action in &self.actions {
            for role in std::iter::once(action.actor.as_str()).chain(action.receiver.as_deref()) {
                if seen.insert(role) {
                    roles.push(role);
                }
            }
        }
        roles
    }

    pub fn runs_in(&self, scheme: OffensiveScheme) -> bool {
        self.schemes.is_empty() || self.schemes.contains(&scheme)
    }

    /// Checks ids are unique, every outcome table is non-empty, every
    /// probability is a finite non-negative number and every `next` pointer
    /// resolves to an action of this play or a terminal marker.
    pub fn validate(&self) -> Result<(), PlayError> {
        let err = |reason: String| PlayError { play: self.name.clone(), reason };

        if self.actions.is_empty() {
            return Err(err("play has no actions".to_string()));
        }

        let mut ids = HashSet::new();
        for action in &self.actions {
            if !ids.insert(action.id.as_str()) {
                return Err(err(format!("duplicate action id '{}'", action.id)));
            }
        }

        for action in &self.actions {
            if action.outcomes.is_empty() {
                return Err(err(format!("action '{}' has no outcomes", action.id)));
            }
            if !(action.duration.is_finite() && action.duration >= 0.0) {
                return Err(err(format!("action '{}' has an invalid duration", action.id)));
            }
            if action.kind.transfers_ball() && action.receiver.is_none() {
                return Err(err(format!("action '{}' passes without a receiver", action.id)));
            }
            for (key, outcome) in &action.outcomes {
                if !(outcome.probability.is_finite() && outcome.probability >= 0.0) {
                    return Err(err(format!(
                        "outcome '{}' of '{}' has an invalid probability",
                        key, action.id
                    )));
                }
                if let NextStep::Action(target) = &outcome.next {
                    if !ids.contains(target.as_str()) {
                        return Err(err(format!(
                            "outcome '{}' of '{}' points at unknown action '{}'",
                            key, action.id, target
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
