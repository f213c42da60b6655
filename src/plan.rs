//! Slot Plan
//!
//! The ordered filter sequence the generator fills left to right: the
//! starting block applied once, then the regular block repeated.

use crate::catalog::Catalog;
use crate::error::GenerationError;
use crate::filter::Filter;

/// Ordered per-slot filters for one rotation.
#[derive(Debug, Clone)]
pub struct SlotPlan {
    slots: Vec<Filter>,
    starting_len: usize,
}

impl SlotPlan {
    /// Concatenate the starting filters with the regular filters repeated
    /// `repeats` times, preserving order within each block.
    ///
    /// A rotation with no regular slots or a non-positive repeat count is
    /// meaningless and rejected up front.
    pub fn build(
        starting: Vec<Filter>,
        regular: Vec<Filter>,
        repeats: u32,
    ) -> Result<Self, GenerationError> {
        if regular.is_empty() {
            return Err(GenerationError::InvalidConfiguration(
                "at least one regular slot filter is required".to_string(),
            ));
        }
        if repeats < 1 {
            return Err(GenerationError::InvalidConfiguration(format!(
                "repeat count must be positive, got {}",
                repeats
            )));
        }
        let starting_len = starting.len();
        let mut slots = starting;
        slots.reserve(regular.len() * repeats as usize);
        for _ in 0..repeats {
            slots.extend(regular.iter().cloned());
        }
        Ok(Self { slots, starting_len })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Filter] {
        &self.slots
    }

    /// Number of leading slots that came from the starting block.
    pub fn starting_len(&self) -> usize {
        self.starting_len
    }

    /// Fail if any slot filters on an attribute the catalog never defines.
    /// Run before generation so a misspelled key is reported as a
    /// configuration problem rather than an unsatisfiable search.
    pub fn check_attributes(&self, catalog: &Catalog) -> Result<(), GenerationError> {
        for (position, filter) in self.slots.iter().enumerate() {
            for key in filter.keys() {
                if !catalog.defines_attribute(key) {
                    return Err(GenerationError::InvalidConfiguration(format!(
                        "slot {} filters on '{}', which no catalog layer defines",
                        position, key
                    )));
                }
            }
        }
        Ok(())
    }
}
