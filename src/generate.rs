//! Sequence Generator
//!
//! The core engine: randomized backtracking over the slot plan. Walks the
//! plan left to right, sampling uniformly at random from each slot's eligible
//! pool and backtracking when a slot has no candidate left. Search state is
//! an explicit structure with per-choice undo records, so every backtrack
//! step restores exactly the prior state.

use crate::catalog::{Catalog, Layer};
use crate::error::GenerationError;
use crate::plan::SlotPlan;
use crate::policy::SeparationPolicy;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Default bound on total candidate placements before the search gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Live search state for one generation run. Created fresh per run, mutated
/// one placement at a time, rolled back on backtrack, and discarded at the
/// end; it never escapes the generating call.
#[derive(Debug, Default)]
pub struct GenerationState {
    used_names: HashSet<String>,
    last_pos_by_map: HashMap<String, usize>,
}

impl GenerationState {
    /// Whether this exact layer name has already been chosen.
    pub fn is_used(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// The most recent position at which a layer of this map was placed.
    pub fn last_position(&self, map: &str) -> Option<usize> {
        self.last_pos_by_map.get(map).copied()
    }

    /// Record a placement. Returns the map's previous last-position entry so
    /// the caller can restore it on backtrack.
    pub(crate) fn place(&mut self, layer: &Layer, position: usize) -> Option<usize> {
        self.used_names.insert(layer.name.clone());
        self.last_pos_by_map.insert(layer.map.clone(), position)
    }

    /// Undo a placement recorded by [`place`](Self::place).
    pub(crate) fn unplace(&mut self, layer: &Layer, displaced: Option<usize>) {
        self.used_names.remove(&layer.name);
        match displaced {
            Some(previous) => {
                self.last_pos_by_map.insert(layer.map.clone(), previous);
            }
            None => {
                self.last_pos_by_map.remove(&layer.map);
            }
        }
    }
}

/// One chosen layer, annotated with the slot it fills and that slot's filter
/// description.
#[derive(Debug, Clone)]
pub struct ChosenSlot {
    pub slot: usize,
    pub layer: Layer,
    pub description: Vec<String>,
}

/// A completed rotation. Only ever constructed whole; a failed generation
/// yields an error, never a truncated rotation.
#[derive(Debug, Clone)]
pub struct Rotation {
    entries: Vec<ChosenSlot>,
}

impl Rotation {
    pub fn entries(&self) -> &[ChosenSlot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.layer.name.as_str())
    }
}

/// Undo record for one filled slot: the candidates not yet tried there, the
/// catalog index currently placed, and the map position it displaced.
struct Frame {
    pool: Vec<usize>,
    picked: usize,
    displaced: Option<usize>,
}

/// The rotation generator. Pure function of its inputs plus the randomness
/// stream; the catalog is read-only throughout, so independent runs may
/// share it.
#[derive(Debug, Clone)]
pub struct Generator {
    policy: SeparationPolicy,
    max_attempts: u32,
}

impl Generator {
    pub fn new(policy: SeparationPolicy) -> Self {
        Self {
            policy,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Cap the total number of candidate placements across the whole search.
    /// Restrictive filters or a large `min_distance` can make regions of the
    /// search space infeasible; the bound turns that into `Unsatisfiable`
    /// instead of an endless walk.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Produce a rotation satisfying the plan, the separation policy, and
    /// without-replacement sampling, choosing uniformly at random from each
    /// slot's eligible pool.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        plan: &SlotPlan,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Rotation, GenerationError> {
        plan.check_attributes(catalog)?;

        let layers = catalog.layers();
        debug!(
            slots = plan.len(),
            layers = layers.len(),
            min_distance = self.policy.min_distance,
            "starting rotation generation"
        );

        let mut state = GenerationState::default();
        let mut stack: Vec<Frame> = Vec::with_capacity(plan.len());
        let mut attempts: u32 = 0;
        // Deepest slot found with an empty pool; reported on failure.
        let mut deepest: usize = 0;

        let mut position = 0;
        let mut pool = self.eligible_pool(plan, layers, position, &state);
        loop {
            if pool.is_empty() {
                deepest = deepest.max(position);
                let Some(frame) = stack.pop() else {
                    debug!(position = deepest, attempts, "search exhausted");
                    return Err(GenerationError::Unsatisfiable {
                        position: deepest,
                        attempts,
                    });
                };
                state.unplace(&layers[frame.picked], frame.displaced);
                position = stack.len();
                trace!(position, "backtracking");
                // Retry the unwound slot with the candidate just removed
                // already excluded from its pool.
                pool = frame.pool;
                continue;
            }

            if attempts >= self.max_attempts {
                debug!(attempts, "attempt budget exhausted");
                return Err(GenerationError::Unsatisfiable {
                    position: deepest.max(position),
                    attempts,
                });
            }
            attempts += 1;

            let picked = pool.swap_remove(rng.gen_range(0..pool.len()));
            trace!(position, layer = %layers[picked].name, "placed");
            let displaced = state.place(&layers[picked], position);
            stack.push(Frame {
                pool: std::mem::take(&mut pool),
                picked,
                displaced,
            });
            position += 1;
            if position == plan.len() {
                break;
            }
            pool = self.eligible_pool(plan, layers, position, &state);
        }

        let entries = stack
            .iter()
            .enumerate()
            .map(|(slot, frame)| ChosenSlot {
                slot,
                layer: layers[frame.picked].clone(),
                description: plan.slots()[slot].description(),
            })
            .collect();
        debug!(attempts, "rotation complete");
        Ok(Rotation { entries })
    }

    /// Catalog indices matching the slot filter and eligible under the
    /// current state.
    fn eligible_pool(
        &self,
        plan: &SlotPlan,
        layers: &[Layer],
        position: usize,
        state: &GenerationState,
    ) -> Vec<usize> {
        let filter = &plan.slots()[position];
        (0..layers.len())
            .filter(|&i| {
                filter.matches(&layers[i]) && self.policy.is_eligible(&layers[i], position, state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttrValue;
    use crate::filter::{Constraint, Filter};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn layer(name: &str, map: &str, gamemode: &str) -> Layer {
        Layer {
            name: name.to_string(),
            map: map.to_string(),
            bugged: false,
            attributes: BTreeMap::from([(
                "gamemode".to_string(),
                AttrValue::from(gamemode),
            )]),
        }
    }

    fn bugged(name: &str, map: &str, gamemode: &str) -> Layer {
        let mut layer = layer(name, map, gamemode);
        layer.bugged = true;
        layer
    }

    fn by_map(maps: &[&str]) -> Filter {
        Filter::any().with("map", Constraint::any_of(maps.iter().copied()))
    }

    fn generate_seeded(
        generator: &Generator,
        plan: &SlotPlan,
        catalog: &Catalog,
        seed: u64,
    ) -> Result<Rotation, GenerationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        generator.generate(plan, catalog, &mut rng)
    }

    #[test]
    fn distance_scenario_forces_shared_map_to_edges() {
        // Two standalone maps plus two variants of map B. With four slots and
        // distance 3, the B variants can only sit at positions 0 and 3.
        let catalog = Catalog::new(vec![
            layer("A1", "A1", "AAS"),
            layer("A2", "A2", "AAS"),
            layer("B1", "B", "AAS"),
            layer("B2", "B", "Invasion"),
        ])
        .unwrap();
        let plan =
            SlotPlan::build(Vec::new(), vec![by_map(&["A1", "A2", "B"])], 4).unwrap();
        let generator = Generator::new(SeparationPolicy::new(3));

        for seed in 0..50 {
            let rotation = generate_seeded(&generator, &plan, &catalog, seed).unwrap();
            let b_positions: Vec<usize> = rotation
                .entries()
                .iter()
                .filter(|entry| entry.layer.map == "B")
                .map(|entry| entry.slot)
                .collect();
            assert_eq!(b_positions, vec![0, 3], "seed {}", seed);
        }
    }

    #[test]
    fn distance_scenario_unsatisfiable_when_too_strict() {
        // Same catalog, but distance 4 cannot be met within four slots.
        let catalog = Catalog::new(vec![
            layer("A1", "A1", "AAS"),
            layer("A2", "A2", "AAS"),
            layer("B1", "B", "AAS"),
            layer("B2", "B", "Invasion"),
        ])
        .unwrap();
        let plan =
            SlotPlan::build(Vec::new(), vec![by_map(&["A1", "A2", "B"])], 4).unwrap();
        let generator = Generator::new(SeparationPolicy::new(4));

        let err = generate_seeded(&generator, &plan, &catalog, 7).unwrap_err();
        assert!(matches!(err, GenerationError::Unsatisfiable { .. }));
    }

    #[test]
    fn all_bugged_pool_is_unsatisfiable_at_that_slot() {
        let catalog = Catalog::new(vec![
            layer("Sumari Skirmish v1", "Sumari", "Skirmish"),
            bugged("Chora Invasion v1", "Chora", "Invasion"),
            bugged("Belaya Invasion v1", "Belaya", "Invasion"),
        ])
        .unwrap();
        let plan = SlotPlan::build(
            vec![Filter::any().with("gamemode", Constraint::one("Skirmish"))],
            vec![Filter::any().with("gamemode", Constraint::one("Invasion"))],
            1,
        )
        .unwrap();
        let generator = Generator::new(SeparationPolicy::default());

        let err = generate_seeded(&generator, &plan, &catalog, 3).unwrap_err();
        assert!(
            matches!(err, GenerationError::Unsatisfiable { position: 1, .. }),
            "expected slot 1 to be the unfillable one, got {:?}",
            err
        );
    }

    #[test]
    fn without_replacement_exhaustion_is_detected() {
        // Ten slots all demanding Chora, but only two Chora layers exist.
        let catalog = Catalog::new(vec![
            layer("Chora AAS v1", "Chora", "AAS"),
            layer("Chora AAS v2", "Chora", "AAS"),
            layer("Belaya AAS v1", "Belaya", "AAS"),
        ])
        .unwrap();
        let plan = SlotPlan::build(Vec::new(), vec![by_map(&["Chora"])], 10).unwrap();
        let generator = Generator::new(SeparationPolicy::new(0));

        let err = generate_seeded(&generator, &plan, &catalog, 11).unwrap_err();
        assert!(matches!(err, GenerationError::Unsatisfiable { position: 2, .. }));
    }

    #[test]
    fn attempt_budget_bounds_the_search() {
        // Every layer shares one map, so slot 1 can never be filled; the
        // search terminates either by exhaustion or by the attempt budget.
        let layers: Vec<Layer> = (0..10)
            .map(|i| layer(&format!("X v{}", i), "X", "AAS"))
            .collect();
        let catalog = Catalog::new(layers).unwrap();
        let plan = SlotPlan::build(Vec::new(), vec![Filter::any()], 3).unwrap();
        let generator = Generator::new(SeparationPolicy::new(3)).with_max_attempts(5);

        let err = generate_seeded(&generator, &plan, &catalog, 0).unwrap_err();
        match err {
            GenerationError::Unsatisfiable { position, attempts } => {
                assert_eq!(position, 1);
                assert!(attempts <= 5);
            }
            other => panic!("expected Unsatisfiable, got {:?}", other),
        }
    }

    #[test]
    fn unknown_filter_attribute_fails_before_any_search() {
        let catalog = Catalog::new(vec![layer("Chora AAS v1", "Chora", "AAS")]).unwrap();
        let misspelled = Filter::any().with("game_mode", Constraint::one("AAS"));
        let plan = SlotPlan::build(Vec::new(), vec![misspelled], 1).unwrap();
        let generator = Generator::new(SeparationPolicy::default());

        let err = generate_seeded(&generator, &plan, &catalog, 0).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfiguration(_)));
    }

    #[test]
    fn same_seed_yields_identical_rotation() {
        let catalog = Catalog::new(
            (0..20)
                .map(|i| layer(&format!("M{} AAS v1", i), &format!("M{}", i), "AAS"))
                .collect(),
        )
        .unwrap();
        let plan = SlotPlan::build(Vec::new(), vec![Filter::any()], 8).unwrap();
        let generator = Generator::new(SeparationPolicy::default());

        let first = generate_seeded(&generator, &plan, &catalog, 42).unwrap();
        let second = generate_seeded(&generator, &plan, &catalog, 42).unwrap();
        let names = |r: &Rotation| r.layer_names().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn selection_is_not_first_eligible() {
        // With 20 equally eligible layers, fifty seeds landing on the same
        // first pick would mean the pool order decides, not the sampler.
        let catalog = Catalog::new(
            (0..20)
                .map(|i| layer(&format!("M{} AAS v1", i), &format!("M{}", i), "AAS"))
                .collect(),
        )
        .unwrap();
        let plan = SlotPlan::build(Vec::new(), vec![Filter::any()], 1).unwrap();
        let generator = Generator::new(SeparationPolicy::default());

        let mut first_picks = HashSet::new();
        for seed in 0..50 {
            let rotation = generate_seeded(&generator, &plan, &catalog, seed).unwrap();
            first_picks.insert(rotation.entries()[0].layer.name.clone());
        }
        assert!(first_picks.len() > 1);
    }

    #[test]
    fn entries_carry_slot_index_and_description() {
        let catalog = Catalog::new(vec![
            layer("Sumari Skirmish v1", "Sumari", "Skirmish"),
            layer("Chora AAS v1", "Chora", "AAS"),
        ])
        .unwrap();
        let plan = SlotPlan::build(
            vec![Filter::any().with("gamemode", Constraint::one("Skirmish"))],
            vec![Filter::any().with("gamemode", Constraint::one("AAS"))],
            1,
        )
        .unwrap();
        let generator = Generator::new(SeparationPolicy::default());

        let rotation = generate_seeded(&generator, &plan, &catalog, 1).unwrap();
        assert_eq!(rotation.entries()[0].slot, 0);
        assert_eq!(rotation.entries()[0].description, vec!["Skirmish"]);
        assert_eq!(rotation.entries()[1].slot, 1);
        assert_eq!(rotation.entries()[1].description, vec!["AAS"]);
    }

    #[test]
    fn state_place_and_unplace_round_trip() {
        let first = layer("Chora AAS v1", "Chora", "AAS");
        let second = layer("Chora Invasion v1", "Chora", "Invasion");
        let mut state = GenerationState::default();

        let displaced_first = state.place(&first, 0);
        assert_eq!(displaced_first, None);
        let displaced_second = state.place(&second, 4);
        assert_eq!(displaced_second, Some(0));
        assert_eq!(state.last_position("Chora"), Some(4));

        state.unplace(&second, displaced_second);
        assert_eq!(state.last_position("Chora"), Some(0));
        assert!(!state.is_used("Chora Invasion v1"));
        assert!(state.is_used("Chora AAS v1"));

        state.unplace(&first, displaced_first);
        assert_eq!(state.last_position("Chora"), None);
        assert!(!state.is_used("Chora AAS v1"));
    }
}
