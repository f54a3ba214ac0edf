// Active selection store - the single source of truth for what is selected and highlighted
use bevy::prelude::*;

use super::config::SelectorConfig;
use super::pipeline::{dedup_preserving_order, SelectionIntent, SelectionPipeline};
use super::selectable::SelectableWorld;

/// Change notification queued after a mutation has fully completed.
/// One per mutating call, never one per unit.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionNotification {
    SelectionChanged(Vec<Entity>),
    HighlightChanged(Vec<Entity>),
    HoverChanged(Option<Entity>),
}

/// Selection store resource.
///
/// Mutations go through `&mut dyn SelectableWorld` so the unit flags are written in the
/// same call that updates the lists: for every unit, `is_selected` matches membership in
/// `selected()` once a call returns. Notifications are queued, not dispatched, and are
/// drained by `publish_selection_events` after the selector tick; handlers therefore
/// can never re-enter the store mid-mutation.
#[derive(Resource)]
pub struct ActiveSelections {
    selected: Vec<Entity>,
    highlighted: Vec<Entity>,
    hovering_unit: Option<Entity>,
    clicked_unit: Option<Entity>, // Last single-clicked unit, for double-click matching
    pub pipeline: SelectionPipeline,
    max_active_selections: usize,
    cap_enabled: bool,
    group_support: bool,
    filter_highlights: bool,
    notifications: Vec<SelectionNotification>,
}

impl Default for ActiveSelections {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default())
    }
}

impl ActiveSelections {
    pub fn from_config(config: &SelectorConfig) -> Self {
        Self {
            selected: Vec::new(),
            highlighted: Vec::new(),
            hovering_unit: None,
            clicked_unit: None,
            pipeline: SelectionPipeline::default(),
            max_active_selections: config.max_active_selections,
            cap_enabled: config.cap_enabled,
            group_support: config.group_support,
            filter_highlights: config.filter_highlights,
            notifications: Vec::new(),
        }
    }

    // ---- Read-only access ----

    pub fn selected(&self) -> &[Entity] {
        &self.selected
    }

    pub fn highlighted(&self) -> &[Entity] {
        &self.highlighted
    }

    pub fn hovering_unit(&self) -> Option<Entity> {
        self.hovering_unit
    }

    pub fn clicked_unit(&self) -> Option<Entity> {
        self.clicked_unit
    }

    pub fn is_selected(&self, unit: Entity) -> bool {
        self.selected.contains(&unit)
    }

    pub fn max_active_selections(&self) -> usize {
        self.max_active_selections
    }

    pub fn cap_enabled(&self) -> bool {
        self.cap_enabled
    }

    /// Free slots under the cap; unbounded when capping is off
    pub fn remaining_capacity(&self) -> usize {
        if self.cap_enabled {
            self.max_active_selections.saturating_sub(self.selected.len())
        } else {
            usize::MAX
        }
    }

    pub fn drain_notifications(&mut self) -> std::vec::Drain<'_, SelectionNotification> {
        self.notifications.drain(..)
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    // ---- Selection ----

    /// Drop the current selection and highlights, then install `units`.
    /// With `process == false` the list is trusted (quick-slot snapshots) and skips the
    /// filter/sort pipeline; the cap still applies.
    pub fn replace_selection(&mut self, units: &[Entity], process: bool, world: &mut dyn SelectableWorld) {
        let previous = std::mem::take(&mut self.selected);
        for &unit in &previous {
            world.deselect(unit);
        }
        self.clear_highlights(world);

        let mut incoming = if process {
            let limit = self.cap_enabled.then_some(self.max_active_selections);
            self.run_pipeline(units, SelectionIntent::Replace, limit, &*world)
        } else {
            let mut verbatim = units.to_vec();
            dedup_preserving_order(&mut verbatim);
            if self.cap_enabled {
                verbatim.truncate(self.max_active_selections);
            }
            verbatim
        };

        for &unit in &incoming {
            world.select(unit);
        }
        std::mem::swap(&mut self.selected, &mut incoming);

        if !previous.is_empty() || !self.selected.is_empty() {
            if self.selected.is_empty() {
                info!("Selection cleared");
            } else {
                info!("Selected {} unit(s)", self.selected.len());
            }
            self.notify_selection();
        }
    }

    /// Merge `units` into the current selection, up to the remaining capacity
    pub fn add_selection(&mut self, units: &[Entity], world: &mut dyn SelectableWorld) {
        let limit = self.cap_enabled.then(|| self.remaining_capacity());
        let added = self.run_pipeline(units, SelectionIntent::Add, limit, &*world);
        if added.is_empty() {
            return;
        }

        for &unit in &added {
            world.select(unit);
        }
        self.selected.extend(added.iter().copied());

        info!("Added {} unit(s) to selection ({} total)", added.len(), self.selected.len());
        self.notify_selection();
    }

    /// Deselect if selected, otherwise select if the cap leaves room
    pub fn toggle_single_selection(&mut self, unit: Entity, world: &mut dyn SelectableWorld) {
        let unit = self.redirect(unit, &*world);

        if let Some(pos) = self.selected.iter().position(|&u| u == unit) {
            self.selected.remove(pos);
            world.deselect(unit);
            debug!("Deselected {:?}", unit);
        } else if self.remaining_capacity() > 0 {
            self.selected.push(unit);
            world.select(unit);
            debug!("Added {:?} to selection ({} total)", unit, self.selected.len());
        } else {
            debug!("Selection full, ignoring {:?}", unit);
            return;
        }
        self.notify_selection();
    }

    pub fn deselect(&mut self, units: &[Entity], world: &mut dyn SelectableWorld) {
        let mut removed = 0;
        for &unit in units {
            let unit = self.redirect(unit, &*world);
            if let Some(pos) = self.selected.iter().position(|&u| u == unit) {
                self.selected.remove(pos);
                world.deselect(unit);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Deselected {} unit(s)", removed);
            self.notify_selection();
        }
    }

    pub fn deselect_all(&mut self, world: &mut dyn SelectableWorld) {
        if self.selected.is_empty() {
            return;
        }
        for unit in self.selected.drain(..) {
            world.deselect(unit);
        }
        info!("Selection cleared");
        self.notify_selection();
    }

    // ---- Highlight ----

    /// Make `units` the highlighted set. Only units entering the set get `highlight()`,
    /// only units leaving it get `unhighlight()`; the hovered unit keeps its highlight
    /// when it leaves because hover owns it too.
    pub fn highlight(&mut self, units: &[Entity], filter_selected_out: bool, world: &mut dyn SelectableWorld) {
        let incoming = if self.filter_highlights {
            let intent = if filter_selected_out { SelectionIntent::Add } else { SelectionIntent::Replace };
            self.run_pipeline(units, intent, None, &*world)
        } else {
            let mut incoming: Vec<Entity> = units.iter().map(|&u| self.redirect(u, &*world)).collect();
            dedup_preserving_order(&mut incoming);
            if filter_selected_out {
                incoming.retain(|u| !self.selected.contains(u));
            }
            incoming
        };

        let mut changed = false;
        for &unit in &self.highlighted {
            if !incoming.contains(&unit) {
                changed = true;
                if self.hovering_unit != Some(unit) {
                    world.unhighlight(unit);
                }
            }
        }
        for &unit in &incoming {
            if !self.highlighted.contains(&unit) {
                changed = true;
                world.highlight(unit);
            }
        }

        self.highlighted = incoming;
        if changed {
            self.notifications
                .push(SelectionNotification::HighlightChanged(self.highlighted.clone()));
        }
    }

    pub fn clear_highlights(&mut self, world: &mut dyn SelectableWorld) {
        if self.highlighted.is_empty() {
            return;
        }
        for unit in std::mem::take(&mut self.highlighted) {
            if self.hovering_unit != Some(unit) {
                world.unhighlight(unit);
            }
        }
        self.notifications.push(SelectionNotification::HighlightChanged(Vec::new()));
    }

    // ---- Hover ----

    pub fn set_hovering_unit(&mut self, unit: Entity, world: &mut dyn SelectableWorld) {
        let unit = self.redirect(unit, &*world);
        if self.hovering_unit == Some(unit) {
            return;
        }

        if let Some(previous) = self.hovering_unit.take() {
            // The drag highlight may own the same visual
            if !self.highlighted.contains(&previous) {
                world.unhighlight(previous);
            }
        }

        self.hovering_unit = Some(unit);
        world.highlight(unit);
        self.notifications.push(SelectionNotification::HoverChanged(Some(unit)));
    }

    pub fn remove_hovering_unit(&mut self, world: &mut dyn SelectableWorld) {
        let Some(previous) = self.hovering_unit.take() else { return };
        if !self.highlighted.contains(&previous) {
            world.unhighlight(previous);
        }
        self.notifications.push(SelectionNotification::HoverChanged(None));
    }

    // ---- Click tracking ----

    pub fn set_clicked_unit(&mut self, unit: Entity) {
        self.clicked_unit = Some(unit);
    }

    pub fn clear_clicked_unit(&mut self) {
        self.clicked_unit = None;
    }

    // ---- Cleanup ----

    /// Forget every reference to a unit that was destroyed or deactivated.
    /// Each list only notifies if it actually held the unit.
    pub fn clean_up_after_unit(&mut self, unit: Entity, world: &mut dyn SelectableWorld) {
        if let Some(pos) = self.selected.iter().position(|&u| u == unit) {
            self.selected.remove(pos);
            world.deselect(unit);
            self.notify_selection();
        }

        let was_hovered = self.hovering_unit == Some(unit);
        if let Some(pos) = self.highlighted.iter().position(|&u| u == unit) {
            self.highlighted.remove(pos);
            world.unhighlight(unit);
            self.notifications
                .push(SelectionNotification::HighlightChanged(self.highlighted.clone()));
        } else if was_hovered {
            world.unhighlight(unit);
        }

        if was_hovered {
            self.hovering_unit = None;
            self.notifications.push(SelectionNotification::HoverChanged(None));
        }

        if self.clicked_unit == Some(unit) {
            self.clicked_unit = None;
        }
    }

    // ---- Internals ----

    fn redirect(&self, unit: Entity, world: &dyn SelectableWorld) -> Entity {
        if self.group_support {
            world.group_of(unit).unwrap_or(unit)
        } else {
            unit
        }
    }

    fn run_pipeline(
        &self,
        units: &[Entity],
        intent: SelectionIntent,
        limit: Option<usize>,
        world: &dyn SelectableWorld,
    ) -> Vec<Entity> {
        // 1. Group substitution
        let mut candidates: Vec<Entity> = units.iter().map(|&u| self.redirect(u, world)).collect();
        dedup_preserving_order(&mut candidates);

        // 2. Already selected units can't be added again
        if intent == SelectionIntent::Add {
            candidates.retain(|u| !self.selected.contains(u));
        }

        // 3 + 4. Filters, then sorter
        let mut candidates = self.pipeline.run(candidates, intent, world);

        // 5. Cap, keeping sorter priority
        if let Some(limit) = limit {
            candidates.truncate(limit);
        }
        candidates
    }

    fn notify_selection(&mut self) {
        self.notifications
            .push(SelectionNotification::SelectionChanged(self.selected.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::pipeline::{DistanceSorter, PredicateFilter};
    use crate::selection::selectable::test_support::{TestUnit, TestUnits};

    fn store_with_cap(max: usize) -> ActiveSelections {
        ActiveSelections::from_config(&SelectorConfig {
            max_active_selections: max,
            cap_enabled: true,
            ..default()
        })
    }

    fn assert_flags_match(store: &ActiveSelections, world: &TestUnits) {
        for (&unit, state) in &world.units {
            assert_eq!(state.selected, store.is_selected(unit), "flag mismatch for {unit:?}");
        }
    }

    fn selection_events(store: &mut ActiveSelections) -> usize {
        store
            .drain_notifications()
            .filter(|n| matches!(n, SelectionNotification::SelectionChanged(_)))
            .count()
    }

    #[test]
    fn replace_caps_in_sorter_order() {
        let mut world = TestUnits::default();
        let a = world.spawn(Vec3::new(1.0, 0.0, 0.0));
        let b = world.spawn(Vec3::new(2.0, 0.0, 0.0));
        let c = world.spawn(Vec3::new(3.0, 0.0, 0.0));

        let mut store = store_with_cap(2);
        store.pipeline.set_sorter(DistanceSorter { origin: Vec3::ZERO });
        store.replace_selection(&[c, b, a], true, &mut world);

        assert_eq!(store.selected(), &[a, b]);
        assert_flags_match(&store, &world);
        assert_eq!(selection_events(&mut store), 1);
    }

    #[test]
    fn replace_deselects_previous_selection() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(3);
        let mut store = ActiveSelections::default();

        store.replace_selection(&units[..2], true, &mut world);
        store.replace_selection(&units[2..], true, &mut world);

        assert_eq!(store.selected(), &[units[2]]);
        assert_flags_match(&store, &world);
    }

    #[test]
    fn replacing_empty_with_empty_is_silent() {
        let mut world = TestUnits::default();
        let mut store = ActiveSelections::default();
        store.replace_selection(&[], true, &mut world);
        assert!(!store.has_pending_notifications());
    }

    #[test]
    fn unprocessed_replace_skips_filters() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();
        store.pipeline.add_filter(PredicateFilter::new(|_, _, _| false));

        store.replace_selection(&units, true, &mut world);
        assert!(store.selected().is_empty());

        store.replace_selection(&units, false, &mut world);
        assert_eq!(store.selected(), units.as_slice());
        assert_flags_match(&store, &world);
    }

    #[test]
    fn add_at_capacity_admits_nothing() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(4);
        let mut store = store_with_cap(2);

        store.replace_selection(&units[..2], true, &mut world);
        store.drain_notifications().for_each(drop);
        store.add_selection(&units[2..], &mut world);

        assert_eq!(store.selected(), &units[..2]);
        assert_eq!(selection_events(&mut store), 0);
        assert_flags_match(&store, &world);
    }

    #[test]
    fn add_skips_already_selected_and_respects_remaining_capacity() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(4);
        let mut store = store_with_cap(3);

        store.replace_selection(&units[..1], true, &mut world);
        store.add_selection(&[units[0], units[1], units[2], units[3]], &mut world);

        assert_eq!(store.selected(), &units[..3]);
        assert!(store.selected().len() <= store.max_active_selections());
        assert_flags_match(&store, &world);
    }

    #[test]
    fn add_without_cap_takes_everything() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(5);
        let mut store = ActiveSelections::from_config(&SelectorConfig {
            max_active_selections: 1,
            cap_enabled: false,
            ..default()
        });

        store.add_selection(&units, &mut world);
        assert_eq!(store.selected().len(), 5);
    }

    #[test]
    fn filters_see_add_intent() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();
        store
            .pipeline
            .add_filter(PredicateFilter::new(|_, intent, _| intent == SelectionIntent::Replace));

        store.add_selection(&units, &mut world);
        assert!(store.selected().is_empty());
        store.replace_selection(&units, true, &mut world);
        assert_eq!(store.selected().len(), 2);
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();
        store.replace_selection(&units[..1], true, &mut world);

        store.toggle_single_selection(units[1], &mut world);
        assert!(store.is_selected(units[1]));
        store.toggle_single_selection(units[1], &mut world);
        assert!(!store.is_selected(units[1]));
        assert_eq!(store.selected(), &units[..1]);

        store.toggle_single_selection(units[0], &mut world);
        assert!(store.selected().is_empty());
        assert_flags_match(&store, &world);
    }

    #[test]
    fn toggle_respects_cap() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = store_with_cap(1);
        store.replace_selection(&units[..1], true, &mut world);

        store.toggle_single_selection(units[1], &mut world);
        assert_eq!(store.selected(), &units[..1]);
    }

    #[test]
    fn deselect_batch_fires_once() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(4);
        let mut store = ActiveSelections::default();
        store.replace_selection(&units, true, &mut world);
        store.drain_notifications().for_each(drop);

        store.deselect(&units[..3], &mut world);
        assert_eq!(store.selected(), &units[3..]);
        assert_eq!(selection_events(&mut store), 1);

        store.deselect_all(&mut world);
        assert!(store.selected().is_empty());
        assert_eq!(selection_events(&mut store), 1);
        assert_flags_match(&store, &world);
    }

    #[test]
    fn highlight_diff_is_minimal() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(4);
        let mut store = ActiveSelections::default();

        store.highlight(&units[..3], false, &mut world);
        world.clear_calls();
        store.highlight(&units[1..], false, &mut world);

        assert_eq!(world.highlight_calls, vec![units[3]]);
        assert_eq!(world.unhighlight_calls, vec![units[0]]);
        assert_eq!(store.highlighted(), &units[1..]);
    }

    #[test]
    fn unchanged_highlight_is_silent() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();

        store.highlight(&units, false, &mut world);
        store.drain_notifications().for_each(drop);
        world.clear_calls();
        store.highlight(&units, false, &mut world);

        assert!(world.highlight_calls.is_empty());
        assert!(world.unhighlight_calls.is_empty());
        assert!(!store.has_pending_notifications());
    }

    #[test]
    fn highlight_can_filter_selected_out() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(3);
        let mut store = ActiveSelections::default();
        store.replace_selection(&units[..1], true, &mut world);

        store.highlight(&units, true, &mut world);
        assert_eq!(store.highlighted(), &units[1..]);
    }

    #[test]
    fn highlight_is_not_capped() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(5);
        let mut store = store_with_cap(2);
        store.highlight(&units, false, &mut world);
        assert_eq!(store.highlighted().len(), 5);
    }

    #[test]
    fn hover_switch_keeps_highlight_owned_by_drag() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();

        store.set_hovering_unit(units[0], &mut world);
        store.highlight(&units[..1], false, &mut world);
        store.set_hovering_unit(units[1], &mut world);

        assert!(world.units[&units[0]].highlighted);
        assert!(world.units[&units[1]].highlighted);
        assert_eq!(store.hovering_unit(), Some(units[1]));
    }

    #[test]
    fn rehovering_same_unit_is_noop() {
        let mut world = TestUnits::default();
        let unit = world.spawn(Vec3::ZERO);
        let mut store = ActiveSelections::default();

        store.set_hovering_unit(unit, &mut world);
        store.drain_notifications().for_each(drop);
        world.clear_calls();
        store.set_hovering_unit(unit, &mut world);

        assert!(world.highlight_calls.is_empty());
        assert!(!store.has_pending_notifications());
    }

    #[test]
    fn removing_hover_unhighlights() {
        let mut world = TestUnits::default();
        let unit = world.spawn(Vec3::ZERO);
        let mut store = ActiveSelections::default();

        store.set_hovering_unit(unit, &mut world);
        store.remove_hovering_unit(&mut world);

        assert!(!world.units[&unit].highlighted);
        assert_eq!(store.hovering_unit(), None);
        let hover_events: Vec<_> = store
            .drain_notifications()
            .filter(|n| matches!(n, SelectionNotification::HoverChanged(_)))
            .collect();
        assert_eq!(
            hover_events,
            vec![
                SelectionNotification::HoverChanged(Some(unit)),
                SelectionNotification::HoverChanged(None)
            ]
        );
    }

    #[test]
    fn leaving_highlight_keeps_hover_visual() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();

        store.set_hovering_unit(units[0], &mut world);
        store.highlight(&units, false, &mut world);
        store.highlight(&units[1..], false, &mut world);

        assert!(world.units[&units[0]].highlighted);
    }

    #[test]
    fn cleanup_removes_every_reference() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(3);
        let mut store = ActiveSelections::default();

        store.replace_selection(&units, true, &mut world);
        store.highlight(&units, false, &mut world);
        store.set_hovering_unit(units[1], &mut world);
        store.set_clicked_unit(units[1]);
        store.drain_notifications().for_each(drop);

        store.clean_up_after_unit(units[1], &mut world);

        assert!(!store.selected().contains(&units[1]));
        assert!(!store.highlighted().contains(&units[1]));
        assert_eq!(store.hovering_unit(), None);
        assert_eq!(store.clicked_unit(), None);

        let notifications: Vec<_> = store.drain_notifications().collect();
        assert_eq!(notifications.len(), 3);
    }

    #[test]
    fn cleanup_of_unrelated_unit_is_silent() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(2);
        let mut store = ActiveSelections::default();

        store.replace_selection(&units[..1], true, &mut world);
        store.drain_notifications().for_each(drop);
        world.remove(units[1]);
        store.clean_up_after_unit(units[1], &mut world);

        assert!(!store.has_pending_notifications());
        assert_eq!(store.selected(), &units[..1]);
    }

    #[test]
    fn grouped_members_redirect_to_group() {
        let mut world = TestUnits::default();
        let group = world.spawn(Vec3::ZERO);
        let a = world.spawn_with(TestUnit { group: Some(group), category: 1, ..default() });
        let b = world.spawn_with(TestUnit { group: Some(group), category: 1, ..default() });
        let loner = world.spawn(Vec3::ONE);

        let mut store = ActiveSelections::default();
        store.replace_selection(&[a, b, loner], true, &mut world);
        assert_eq!(store.selected(), &[group, loner]);

        store.toggle_single_selection(b, &mut world);
        assert_eq!(store.selected(), &[loner]);
        assert_flags_match(&store, &world);
    }

    #[test]
    fn removed_group_stops_redirecting_members() {
        let mut world = TestUnits::default();
        let group = world.spawn(Vec3::ZERO);
        let a = world.spawn_with(TestUnit { group: Some(group), category: 1, ..default() });
        world.remove(group);

        let mut store = ActiveSelections::default();
        store.replace_selection(&[a], true, &mut world);
        assert_eq!(store.selected(), &[a]);
        assert_flags_match(&store, &world);
    }

    #[test]
    fn group_support_can_be_disabled() {
        let mut world = TestUnits::default();
        let group = world.spawn(Vec3::ZERO);
        let a = world.spawn_with(TestUnit { group: Some(group), category: 1, ..default() });

        let mut store = ActiveSelections::from_config(&SelectorConfig { group_support: false, ..default() });
        store.replace_selection(&[a], true, &mut world);
        assert_eq!(store.selected(), &[a]);
    }

    #[test]
    fn cap_holds_across_mixed_operations() {
        let mut world = TestUnits::default();
        let units = world.spawn_many(10);
        let mut store = store_with_cap(4);

        store.replace_selection(&units[..6], true, &mut world);
        assert!(store.selected().len() <= 4);
        store.add_selection(&units[6..], &mut world);
        assert!(store.selected().len() <= 4);
        store.deselect(&units[..2], &mut world);
        store.add_selection(&units, &mut world);
        assert!(store.selected().len() <= 4);
        for &unit in &units {
            store.toggle_single_selection(unit, &mut world);
            assert!(store.selected().len() <= 4);
        }
        store.replace_selection(&units, false, &mut world);
        assert_eq!(store.selected().len(), 4);
        assert_flags_match(&store, &world);
    }
}
