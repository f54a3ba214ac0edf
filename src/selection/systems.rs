// Selection systems - cleanup, selector tick, quick slots and event publishing
use bevy::prelude::*;

use crate::types::*;

use super::active::{ActiveSelections, SelectionNotification};
use super::config::SelectorConfig;
use super::quick_access::QuickAccessSlots;
use super::selectable::SelectableUnits;
use super::state::{Selector, TickContext};

/// System: Forget units that lost their `Selectable` (despawned or deactivated).
/// Runs before the tick so the selector never resolves a stale entity.
pub fn selection_cleanup_system(
    mut removed: RemovedComponents<Selectable>,
    mut store: ResMut<ActiveSelections>,
    mut slots: ResMut<QuickAccessSlots>,
    mut group_query: Query<(Entity, &mut SelectableGroup)>,
    mut units: SelectableUnits,
) {
    for unit in removed.read() {
        store.clean_up_after_unit(unit, &mut units);
        slots.clean_up_after_unit(unit);

        for (group_entity, mut group) in group_query.iter_mut() {
            let Some(pos) = group.members.iter().position(|&member| member == unit) else {
                continue;
            };
            group.members.remove(pos);
            if group.members.is_empty() {
                warn!("Group {:?} has no members left", group_entity);
            }
        }
    }
}

/// System: Advance the selector state machine one step
pub fn selector_tick_system(
    frame: Res<PointerFrame>,
    candidates: Res<SelectionCandidates>,
    config: Res<SelectorConfig>,
    mut selector: ResMut<Selector>,
    mut store: ResMut<ActiveSelections>,
    mut units: SelectableUnits,
) -> Result {
    let mut ctx = TickContext {
        frame: &frame,
        surfaces: &candidates.surfaces,
        config: &config,
        store: &mut store,
        world: &mut units,
    };
    selector.tick(&mut ctx)?;
    Ok(())
}

/// System: Save or recall quick-access slots on number keys
pub fn quick_access_system(
    frame: Res<PointerFrame>,
    mut slots: ResMut<QuickAccessSlots>,
    mut store: ResMut<ActiveSelections>,
    mut units: SelectableUnits,
) -> Result {
    let Some(index) = frame.quick_slot_pressed else {
        return Ok(());
    };
    // More keys bound than slots configured: an unbacked key is a miss
    if index >= slots.slot_count() {
        debug!("Quick slot key {} has no slot (slot count: {})", index + 1, slots.slot_count());
        return Ok(());
    }
    slots.toggle(index, frame.quick_save_held, &mut store, &mut units)?;
    Ok(())
}

/// System: Drain queued store notifications into Bevy events
pub fn publish_selection_events(
    mut store: ResMut<ActiveSelections>,
    mut selection_events: EventWriter<SelectionChanged>,
    mut highlight_events: EventWriter<HighlightChanged>,
    mut hover_events: EventWriter<HoverChanged>,
) {
    // Checked through Deref first so quiet frames don't mark the store changed
    if !store.has_pending_notifications() {
        return;
    }

    for notification in store.drain_notifications() {
        match notification {
            SelectionNotification::SelectionChanged(selected) => {
                selection_events.write(SelectionChanged { selected });
            }
            SelectionNotification::HighlightChanged(highlighted) => {
                highlight_events.write(HighlightChanged { highlighted });
            }
            SelectionNotification::HoverChanged(unit) => {
                hover_events.write(HoverChanged { unit });
            }
        }
    }
}
