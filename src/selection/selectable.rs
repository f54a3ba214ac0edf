// Selectable capability - how the selection store talks to the units it selects
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::types::Selectable;

/// Capability set the store needs from the world: flip the visual/state flags of a unit
/// and answer the few questions filters and sorters ask about it.
///
/// Calls on entities that are gone (or no longer selectable) are ignored.
pub trait SelectableWorld {
    fn select(&mut self, unit: Entity);
    fn deselect(&mut self, unit: Entity);
    fn highlight(&mut self, unit: Entity);
    fn unhighlight(&mut self, unit: Entity);

    fn is_selected(&self, unit: Entity) -> bool;
    fn is_highlighted(&self, unit: Entity) -> bool;

    /// Owning group, if the unit belongs to one
    fn group_of(&self, unit: Entity) -> Option<Entity>;
    fn category(&self, unit: Entity) -> u32;
    fn position(&self, unit: Entity) -> Option<Vec3>;
}

/// ECS-backed `SelectableWorld` for use inside systems
#[derive(SystemParam)]
pub struct SelectableUnits<'w, 's> {
    units: Query<'w, 's, (&'static mut Selectable, Option<&'static GlobalTransform>)>,
}

impl SelectableUnits<'_, '_> {
    fn set_flags(&mut self, unit: Entity, selected: Option<bool>, highlighted: Option<bool>) {
        let Ok((mut selectable, _)) = self.units.get_mut(unit) else { return };
        if let Some(selected) = selected {
            if selectable.selected != selected {
                selectable.selected = selected;
            }
        }
        if let Some(highlighted) = highlighted {
            if selectable.highlighted != highlighted {
                selectable.highlighted = highlighted;
            }
        }
    }
}

impl SelectableWorld for SelectableUnits<'_, '_> {
    fn select(&mut self, unit: Entity) {
        self.set_flags(unit, Some(true), None);
    }

    fn deselect(&mut self, unit: Entity) {
        self.set_flags(unit, Some(false), None);
    }

    fn highlight(&mut self, unit: Entity) {
        self.set_flags(unit, None, Some(true));
    }

    fn unhighlight(&mut self, unit: Entity) {
        self.set_flags(unit, None, Some(false));
    }

    fn is_selected(&self, unit: Entity) -> bool {
        self.units.get(unit).is_ok_and(|(s, _)| s.selected)
    }

    fn is_highlighted(&self, unit: Entity) -> bool {
        self.units.get(unit).is_ok_and(|(s, _)| s.highlighted)
    }

    fn group_of(&self, unit: Entity) -> Option<Entity> {
        // A despawned group no longer owns its members
        self.units
            .get(unit)
            .ok()
            .and_then(|(s, _)| s.group)
            .filter(|&group| self.units.contains(group))
    }

    fn category(&self, unit: Entity) -> u32 {
        self.units.get(unit).map_or(0, |(s, _)| s.category)
    }

    fn position(&self, unit: Entity) -> Option<Vec3> {
        self.units
            .get(unit)
            .ok()
            .and_then(|(_, transform)| transform.map(|t| t.translation()))
    }
}
