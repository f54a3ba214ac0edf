// Selection filter/sorter pipeline
//
// Candidates flow: group substitution -> drop already selected (Add only) -> filters in
// registration order -> sorter -> cap. Filters see the whole candidate pool so they can
// evict worse candidates before the sorter ranks the rest; the cap runs last so the
// sorter decides who survives truncation.
use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::selectable::SelectableWorld;

/// Whether a candidate batch merges into or supplants the current selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionIntent {
    Add,
    Replace,
}

/// One stage of the candidate pipeline. Must not reorder candidates it keeps.
pub trait SelectionFilter: Send + Sync + 'static {
    fn filter(
        &self,
        candidates: Vec<Entity>,
        intent: SelectionIntent,
        world: &dyn SelectableWorld,
    ) -> Vec<Entity>;
}

/// Total order applied to the filtered candidates
pub trait SelectionSorter: Send + Sync + 'static {
    fn compare(&self, a: Entity, b: Entity, world: &dyn SelectableWorld) -> Ordering;
}

/// Keeps candidates whose category intersects the mask
#[derive(Clone, Copy, Debug)]
pub struct CategoryFilter {
    pub mask: u32,
}

impl SelectionFilter for CategoryFilter {
    fn filter(&self, mut candidates: Vec<Entity>, _: SelectionIntent, world: &dyn SelectableWorld) -> Vec<Entity> {
        candidates.retain(|&unit| world.category(unit) & self.mask != 0);
        candidates
    }
}

/// If any candidate matches the preferred categories, drops every candidate that doesn't.
/// Boxing over a base with units in it selects the units, not the buildings.
#[derive(Clone, Copy, Debug)]
pub struct PreferCategoryFilter {
    pub preferred: u32,
}

impl SelectionFilter for PreferCategoryFilter {
    fn filter(&self, mut candidates: Vec<Entity>, _: SelectionIntent, world: &dyn SelectableWorld) -> Vec<Entity> {
        if candidates.iter().any(|&unit| world.category(unit) & self.preferred != 0) {
            candidates.retain(|&unit| world.category(unit) & self.preferred != 0);
        }
        candidates
    }
}

/// Filter from a per-unit predicate
pub struct PredicateFilter<F> {
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(Entity, SelectionIntent, &dyn SelectableWorld) -> bool + Send + Sync + 'static,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> SelectionFilter for PredicateFilter<F>
where
    F: Fn(Entity, SelectionIntent, &dyn SelectableWorld) -> bool + Send + Sync + 'static,
{
    fn filter(&self, mut candidates: Vec<Entity>, intent: SelectionIntent, world: &dyn SelectableWorld) -> Vec<Entity> {
        candidates.retain(|&unit| (self.predicate)(unit, intent, world));
        candidates
    }
}

/// Closest to a reference point first. Units without a position sort last.
#[derive(Clone, Copy, Debug)]
pub struct DistanceSorter {
    pub origin: Vec3,
}

impl SelectionSorter for DistanceSorter {
    fn compare(&self, a: Entity, b: Entity, world: &dyn SelectableWorld) -> Ordering {
        let da = world.position(a).map(|p| p.distance_squared(self.origin));
        let db = world.position(b).map(|p| p.distance_squared(self.origin));
        match (da, db) {
            (Some(da), Some(db)) => da.total_cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Registered filters plus the optional sorter
#[derive(Default)]
pub struct SelectionPipeline {
    filters: Vec<Box<dyn SelectionFilter>>,
    sorter: Option<Box<dyn SelectionSorter>>,
}

impl SelectionPipeline {
    pub fn add_filter(&mut self, filter: impl SelectionFilter) {
        self.filters.push(Box::new(filter));
    }

    pub fn set_sorter(&mut self, sorter: impl SelectionSorter) {
        self.sorter = Some(Box::new(sorter));
    }

    pub fn clear_sorter(&mut self) {
        self.sorter = None;
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Filters then sorts. Sorting is stable, so equal candidates keep their incoming order.
    pub fn run(&self, candidates: Vec<Entity>, intent: SelectionIntent, world: &dyn SelectableWorld) -> Vec<Entity> {
        let mut candidates = self
            .filters
            .iter()
            .fold(candidates, |candidates, filter| filter.filter(candidates, intent, world));

        if let Some(sorter) = &self.sorter {
            candidates.sort_by(|&a, &b| sorter.compare(a, b, world));
        }
        candidates
    }
}

/// Remove duplicates, keeping the first occurrence
pub fn dedup_preserving_order(units: &mut Vec<Entity>) {
    let mut seen = HashSet::with_capacity(units.len());
    units.retain(|unit| seen.insert(*unit));
}
