// Quick-access slots - saved selections recalled by number key
use bevy::prelude::*;
use std::collections::HashMap;

use crate::errors::{SelectionError, SelectionResult};

use super::active::ActiveSelections;
use super::selectable::SelectableWorld;

/// Saved selection snapshots keyed by slot index
#[derive(Resource, Debug)]
pub struct QuickAccessSlots {
    slots: HashMap<usize, Vec<Entity>>,
    slot_count: usize,
}

impl QuickAccessSlots {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: HashMap::new(),
            slot_count,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Overwrite slot `index`. Saving an empty selection clears the slot.
    pub fn save(&mut self, index: usize, selection: &[Entity]) -> SelectionResult<()> {
        self.check_index(index)?;
        if selection.is_empty() {
            self.slots.remove(&index);
        } else {
            self.slots.insert(index, selection.to_vec());
        }
        Ok(())
    }

    pub fn load(&self, index: usize) -> Option<&[Entity]> {
        self.slots.get(&index).map(Vec::as_slice)
    }

    pub fn clear(&mut self, index: usize) {
        self.slots.remove(&index);
    }

    /// Slot key pressed: save the live selection while the save modifier is held,
    /// otherwise install the saved snapshot as the new selection.
    pub fn toggle(
        &mut self,
        index: usize,
        saving_held: bool,
        store: &mut ActiveSelections,
        world: &mut dyn SelectableWorld,
    ) -> SelectionResult<()> {
        self.check_index(index)?;

        if saving_held {
            self.save(index, store.selected())?;
            info!("Saved {} unit(s) to quick slot {}", store.selected().len(), index + 1);
            return Ok(());
        }

        let Some(saved) = self.slots.get(&index) else {
            debug!("Quick slot {} is empty", index + 1);
            return Ok(());
        };
        // Snapshot was a valid selection when saved and is pruned on cleanup
        store.replace_selection(saved, false, world);
        info!("Recalled quick slot {} ({} unit(s))", index + 1, saved.len());
        Ok(())
    }

    /// Drop a destroyed or deactivated unit from every slot; empty slots are removed
    pub fn clean_up_after_unit(&mut self, unit: Entity) {
        self.slots.retain(|_, saved| {
            saved.retain(|&u| u != unit);
            !saved.is_empty()
        });
    }

    fn check_index(&self, index: usize) -> SelectionResult<()> {
        if index >= self.slot_count {
            return Err(SelectionError::InvalidQuickSlot {
                index,
                slot_count: self.slot_count,
            });
        }
        Ok(())
    }
}

impl Default for QuickAccessSlots {
    fn default() -> Self {
        Self::new(crate::constants::QUICK_SLOT_COUNT)
    }
}
