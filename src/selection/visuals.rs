// Selection visuals - ground rings for selected/highlighted units and the box-select rectangle
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::constants::*;
use crate::types::*;

use super::state::Selector;

/// Small offset above the unit origin so rings don't z-fight with the ground
const VISUAL_GROUND_OFFSET: f32 = 0.05;

/// Marker for the box selection UI node
#[derive(Component)]
pub struct BoxSelectionVisual;

fn ground_ring(gizmos: &mut Gizmos, position: Vec3, radius: f32, color: Color) {
    // Gizmo circles lie in the XY plane; tip them onto the ground
    let isometry = Isometry3d::new(
        position + Vec3::Y * VISUAL_GROUND_OFFSET,
        Quat::from_rotation_x(FRAC_PI_2),
    );
    gizmos.circle(isometry, radius + SELECTION_RING_PADDING, color);
}

/// System: Draw rings under selected and highlighted units.
/// Members of a selected group get the group color.
pub fn selection_visual_system(
    mut gizmos: Gizmos,
    unit_query: Query<(&Selectable, &GlobalTransform), Without<SelectableGroup>>,
    group_query: Query<(&Selectable, &SelectableGroup)>,
) {
    for (selectable, transform) in unit_query.iter() {
        let color = if selectable.selected {
            SELECTION_RING_COLOR
        } else if selectable.highlighted {
            HIGHLIGHT_RING_COLOR
        } else {
            continue;
        };
        ground_ring(&mut gizmos, transform.translation(), selectable.radius, color);
    }

    for (group_selectable, group) in group_query.iter() {
        let color = if group_selectable.selected {
            GROUP_RING_COLOR
        } else if group_selectable.highlighted {
            HIGHLIGHT_RING_COLOR
        } else {
            continue;
        };

        for &member in &group.members {
            let Ok((member_selectable, transform)) = unit_query.get(member) else { continue };
            ground_ring(&mut gizmos, transform.translation(), member_selectable.radius, color);
        }
    }
}

/// System: Show the drag rectangle while a box selection is in progress
pub fn box_selection_visual_system(
    mut commands: Commands,
    selector: Res<Selector>,
    mut existing_visual: Query<(Entity, &mut Node), With<BoxSelectionVisual>>,
) {
    let Some(rect) = selector.drag_rect() else {
        // Not box selecting - despawn any existing visual
        for (entity, _) in existing_visual.iter() {
            commands.entity(entity).despawn();
        }
        return;
    };

    let size = rect.size();

    // Resize the existing node in place
    if let Ok((_, mut node)) = existing_visual.single_mut() {
        node.left = Val::Px(rect.min.x);
        node.top = Val::Px(rect.min.y);
        node.width = Val::Px(size.x);
        node.height = Val::Px(size.y);
        return;
    }

    // Semi-transparent green box with a border
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(rect.min.x),
            top: Val::Px(rect.min.y),
            width: Val::Px(size.x),
            height: Val::Px(size.y),
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.2, 0.8, 0.3, 0.15)),
        BorderColor(Color::srgba(0.3, 1.0, 0.4, 0.8)),
        BoxSelectionVisual,
    ));
}
