//! Slot Filters
//!
//! Attribute constraints a candidate layer must satisfy to fill a slot.
//! Constraints AND across attribute keys; the admissible values for one key
//! OR within it. An empty filter matches every layer.

use crate::catalog::{AttrValue, Layer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Admissible values for one attribute: a single required value, or any out
/// of a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    One(AttrValue),
    AnyOf(Vec<AttrValue>),
}

impl Constraint {
    pub fn one(value: impl Into<AttrValue>) -> Self {
        Constraint::One(value.into())
    }

    pub fn any_of<V: Into<AttrValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Constraint::AnyOf(values.into_iter().map(Into::into).collect())
    }

    /// Whether the given layer value satisfies this constraint.
    pub fn admits(&self, value: &AttrValue) -> bool {
        self.values().iter().any(|admissible| admissible == value)
    }

    fn values(&self) -> &[AttrValue] {
        match self {
            Constraint::One(value) => std::slice::from_ref(value),
            Constraint::AnyOf(values) => values,
        }
    }
}

/// A conjunction of attribute constraints, one slot's worth.
///
/// Stateless and pure: constructed once from configuration, then only ever
/// asked whether a layer matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    constraints: BTreeMap<String, Constraint>,
}

impl Filter {
    /// The empty filter; matches any layer.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.insert(key.into(), constraint);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(String::as_str)
    }

    /// True iff every constraint admits the layer's value for its key.
    ///
    /// The `team` key is special: it admits a layer when either `team1` or
    /// `team2` carries an admissible value. A constraint on a key the layer
    /// does not define fails the whole filter.
    pub fn matches(&self, layer: &Layer) -> bool {
        self.constraints.iter().all(|(key, constraint)| match key.as_str() {
            "team" => ["team1", "team2"].iter().any(|side| {
                layer
                    .attr(side)
                    .map_or(false, |value| constraint.admits(&value))
            }),
            _ => layer
                .attr(key)
                .map_or(false, |value| constraint.admits(&value)),
        })
    }

    /// Human-readable summary of the admissible values, used to annotate the
    /// slots a rotation was chosen under. Boolean constraints render as the
    /// key name; the empty filter renders as "any".
    pub fn description(&self) -> Vec<String> {
        if self.constraints.is_empty() {
            return vec!["any".to_string()];
        }
        let mut parts = Vec::new();
        for (key, constraint) in &self.constraints {
            match constraint {
                Constraint::One(AttrValue::Bool(true)) => parts.push(key.clone()),
                Constraint::One(AttrValue::Bool(false)) => parts.push(format!("not {}", key)),
                Constraint::One(value) => parts.push(value.to_string()),
                Constraint::AnyOf(values) => {
                    parts.extend(values.iter().map(ToString::to_string));
                }
            }
        }
        parts
    }
}
