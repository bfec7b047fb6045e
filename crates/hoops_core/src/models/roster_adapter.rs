//! Roster boundary adapter.
//!
//! Roster providers send players with mixed key casing (`overallRating` vs
//! `overall_rating`), nested or flat attribute tables and numeric or string
//! ids. Everything is normalised here, once, into [`PlayerSnapshot`]; the
//! simulation never sees raw records.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::player::{AttributeCategory, Attributes, Badge, BadgeTier, PlayerSnapshot, Position};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Deserialize)]
pub struct RawBadge {
    #[serde(alias = "badge_id", alias = "badgeId", alias = "name")]
    pub id: String,
    #[serde(alias = "level")]
    pub tier: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayerRecord {
    #[serde(alias = "player_id", alias = "playerId")]
    pub id: Value,
    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: Option<String>,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(alias = "primaryPosition", alias = "primary_position")]
    pub position: String,
    #[serde(default, alias = "secondaryPosition")]
    pub secondary_position: Option<String>,
    #[serde(default, alias = "overallRating", alias = "overall")]
    pub overall_rating: Option<f64>,
    #[serde(default)]
    pub attributes: Option<Value>,
    #[serde(default)]
    pub badges: Vec<RawBadge>,
    #[serde(default)]
    pub fatigue: Option<f64>,
    #[serde(default, alias = "isInjured", alias = "injured")]
    pub is_injured: Option<bool>,
    #[serde(default, alias = "personality")]
    pub morale: Option<f64>,
    #[serde(default)]
    pub tendencies: BTreeMap<String, f64>,
}

/// `threePoint` / `three-point` / `Three Point` → `three_point`.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else if ch == '-' || ch == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

fn rating_value(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(n.round().clamp(0.0, 99.0) as u8)
}

fn category_from_key(key: &str) -> Option<AttributeCategory> {
    match key {
        "offense" | "offensive" => Some(AttributeCategory::Offense),
        "defense" | "defensive" => Some(AttributeCategory::Defense),
        "physical" | "athletic" => Some(AttributeCategory::Physical),
        "mental" => Some(AttributeCategory::Mental),
        _ => None,
    }
}

/// Accepts `{offense: {...}, defense: {...}}` or a flat `{threePoint: 80}` map.
fn normalize_attributes(raw: &Value) -> Attributes {
    let mut attrs = Attributes::default();
    let Value::Object(map) = raw else {
        return attrs;
    };

    for (key, value) in map {
        let key = to_snake_case(key);
        match (category_from_key(&key), value) {
            (Some(cat), Value::Object(inner)) => {
                for (name, v) in inner {
                    if let Some(r) = rating_value(v) {
                        attrs.set(cat, &to_snake_case(name), r);
                    }
                }
            }
            _ => {
                if let Some(r) = rating_value(value) {
                    let cat = AttributeCategory::of(&key).unwrap_or(AttributeCategory::Offense);
                    attrs.set(cat, &key, r);
                }
            }
        }
    }
    attrs
}

fn tier_from_value(value: &Value) -> Option<BadgeTier> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| n.to_string().parse().ok()),
        _ => None,
    }
}

impl RawPlayerRecord {
    pub fn into_snapshot(self) -> Result<PlayerSnapshot> {
        let id = match &self.id {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(SimError::InvalidRoster(format!("unusable player id {}", other)));
            }
        };

        let position: Position = self
            .position
            .parse()
            .map_err(|e| SimError::InvalidRoster(format!("player {}: {}", id, e)))?;
        let secondary_position = self
            .secondary_position
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse().ok())
            .filter(|p| *p != position);

        let name = self.name.clone().unwrap_or_else(|| {
            match (self.first_name.as_deref(), self.last_name.as_deref()) {
                (Some(f), Some(l)) => format!("{} {}", f, l),
                (Some(f), None) => f.to_string(),
                (None, Some(l)) => l.to_string(),
                (None, None) => id.clone(),
            }
        });

        let attributes = self.attributes.as_ref().map(normalize_attributes).unwrap_or_default();
        let overall_rating = self
            .overall_rating
            .map(|r| r.round().clamp(0.0, 99.0) as u8)
            .unwrap_or(70);

        let badges = self
            .badges
            .iter()
            .filter_map(|b| {
                let tier = tier_from_value(&b.tier);
                if tier.is_none() {
                    tracing::warn!(player = %id, badge = %b.id, "dropping badge with unknown tier");
                }
                tier.map(|t| Badge::new(to_snake_case(&b.id), t))
            })
            .collect();

        let tendencies = self
            .tendencies
            .iter()
            .map(|(k, v)| (to_snake_case(k), v.round().clamp(0.0, 99.0) as u8))
            .collect();

        Ok(PlayerSnapshot {
            id,
            name,
            position,
            secondary_position,
            overall_rating,
            attributes,
            badges,
            fatigue: self.fatigue.unwrap_or(0.0).clamp(0.0, 100.0),
            is_injured: self.is_injured.unwrap_or(false),
            morale: self.morale.unwrap_or(50.0).clamp(0.0, 100.0),
            tendencies,
        })
    }
}

/// Parses a JSON array of raw player records.
pub fn players_from_json(json: &str) -> Result<Vec<PlayerSnapshot>> {
    let raw: Vec<RawPlayerRecord> = serde_json::from_str(json)?;
    raw.into_iter().map(RawPlayerRecord::into_snapshot).collect()
}
