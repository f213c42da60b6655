//! Separation Policy
//!
//! The stateful eligibility gate applied to every candidate at every slot:
//! no exact layer repeats anywhere in the rotation, and no two layers of the
//! same map within `min_distance` positions of each other.

use crate::catalog::Layer;
use crate::generate::GenerationState;
use serde::{Deserialize, Serialize};

/// Default minimum number of positions between two layers of the same map.
pub const DEFAULT_MIN_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeparationPolicy {
    /// Minimum number of positions separating two layers that share a map.
    #[serde(default = "default_min_distance")]
    pub min_distance: usize,
}

fn default_min_distance() -> usize {
    DEFAULT_MIN_DISTANCE
}

impl Default for SeparationPolicy {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

impl SeparationPolicy {
    pub fn new(min_distance: usize) -> Self {
        Self { min_distance }
    }

    /// Whether `layer` may be placed at `position` given the choices made so
    /// far. Re-evaluated against live state on every probe; the state changes
    /// with each placement, so the result is never cached.
    pub fn is_eligible(&self, layer: &Layer, position: usize, state: &GenerationState) -> bool {
        if layer.bugged {
            return false;
        }
        if state.is_used(&layer.name) {
            return false;
        }
        match state.last_position(&layer.map) {
            Some(last) => position - last >= self.min_distance,
            None => true,
        }
    }
}
