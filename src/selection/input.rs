// Selection input gathering - turns window, camera and device state into per-frame snapshots
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::types::*;

use super::config::SelectionBindings;

/// System: Snapshot pointer and key state into `PointerFrame`
pub fn gather_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<SelectionBindings>,
    time: Res<Time>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<SelectionCamera>>,
    interactions: Query<&Interaction>,
    mut frame: ResMut<PointerFrame>,
) {
    let cursor_pos = window_query.single().ok().and_then(|window| window.cursor_position());

    // World ray through the cursor
    let ray = cursor_pos.and_then(|cursor| {
        let (camera, camera_transform) = camera_query.single().ok()?;
        camera.viewport_to_world(camera_transform, cursor).ok()
    });

    let any_held = |keys: &[KeyCode]| keys.iter().any(|&key| keyboard.pressed(key));

    *frame = PointerFrame {
        position: cursor_pos,
        ray,
        pressed: mouse_button.just_pressed(bindings.primary),
        released: mouse_button.just_released(bindings.primary),
        modify_held: any_held(&bindings.modify),
        cancel_pressed: keyboard.just_pressed(bindings.cancel),
        quick_save_held: any_held(&bindings.quick_save),
        quick_slot_pressed: bindings.quick_slots.iter().position(|&key| keyboard.just_pressed(key)),
        over_ui: interactions.iter().any(|interaction| *interaction != Interaction::None),
        time: time.elapsed_secs_f64(),
    };
}

/// System: Collect every pickable surface and project it into the viewport
pub fn gather_selection_candidates(
    camera_query: Query<(&Camera, &GlobalTransform), With<SelectionCamera>>,
    unit_query: Query<(Entity, &Selectable, &GlobalTransform), Without<SelectableGroup>>,
    blocker_query: Query<(Entity, &SelectionBlocker, &GlobalTransform), Without<Selectable>>,
    mut candidates: ResMut<SelectionCandidates>,
) {
    let camera = camera_query.single().ok();

    let project = |center: Vec3| -> (Option<Vec2>, f32) {
        let Some((camera, camera_transform)) = camera else {
            return (None, 0.0);
        };
        let screen_pos = camera.world_to_viewport(camera_transform, center).ok();
        (screen_pos, camera_transform.translation().distance(center))
    };

    candidates.surfaces.clear();

    for (entity, selectable, transform) in unit_query.iter() {
        let center = transform.translation();
        let (screen_pos, depth) = project(center);
        candidates.surfaces.push(HitSurface {
            entity,
            center,
            radius: selectable.radius,
            category: selectable.category,
            selectable: true,
            screen_pos,
            depth,
        });
    }

    for (entity, blocker, transform) in blocker_query.iter() {
        let center = transform.translation();
        let (screen_pos, depth) = project(center);
        candidates.surfaces.push(HitSurface {
            entity,
            center,
            radius: blocker.radius,
            category: blocker.category,
            selectable: false,
            screen_pos,
            depth,
        });
    }
}
